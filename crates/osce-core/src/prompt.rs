//! Standardized-patient prompt text.

use crate::case::Case;

/// Opening line the patient speaks when an interview starts.
pub const PATIENT_GREETING: &str = "Hello Doctor, I'm here for my appointment.";

/// Build the hidden system instruction that keeps the model in character
/// for one clinical case.
pub fn system_instruction(case: &Case) -> String {
    format!(
        "You are a standardized patient in an OSCE practice station: {title}.\n\
         Stay in character as the patient at all times and answer in the first person.\n\
         Only reveal details the doctor asks about. Never volunteer a diagnosis and \
         never break character. Keep answers short and conversational, as spoken \
         language.\n\n\
         Patient background:\n{description}",
        title = case.title,
        description = case.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_embeds_case() {
        let case = Case {
            reference: "chest-pain-01".to_string(),
            title: "Acute chest pain".to_string(),
            description: "54-year-old male smoker with crushing central chest pain."
                .to_string(),
            created_at: 0,
        };

        let instruction = system_instruction(&case);
        assert!(instruction.contains("Acute chest pain"));
        assert!(instruction.contains("54-year-old male smoker"));
        assert!(!instruction.contains(PATIENT_GREETING));
    }
}
