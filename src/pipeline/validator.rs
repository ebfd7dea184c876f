use crate::{
    error::ValidationError,
    models::{AspectRatio, ImageModel, PromptInput, ValidatedPrompt},
};

pub const MIN_PROMPT_CHARS: usize = 3;
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Checks a raw submission. Rules run in order and the first failure is reported.
pub fn validate(
    input: &PromptInput,
    default_model: ImageModel,
) -> Result<ValidatedPrompt, ValidationError> {
    let length = input.prompt.chars().count();
    if length < MIN_PROMPT_CHARS {
        return Err(ValidationError::PromptTooShort);
    }
    if length > MAX_PROMPT_CHARS {
        return Err(ValidationError::PromptTooLong {
            max: MAX_PROMPT_CHARS,
        });
    }

    let aspect_ratio: AspectRatio = input
        .aspect_ratio
        .parse()
        .map_err(ValidationError::UnsupportedAspectRatio)?;

    let model = match input.model.as_deref() {
        Some(raw) => raw
            .parse::<ImageModel>()
            .map_err(ValidationError::UnsupportedModel)?,
        None => default_model,
    };

    Ok(ValidatedPrompt {
        prompt: input.prompt.clone(),
        model,
        aspect_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(prompt: &str) -> Result<ValidatedPrompt, ValidationError> {
        validate(&PromptInput::new(prompt, "1:1"), ImageModel::default())
    }

    #[test]
    fn test_length_bounds() {
        for short in ["", "a", "ab"] {
            assert_eq!(check(short), Err(ValidationError::PromptTooShort));
        }
        assert!(check("abc").is_ok());
        assert!(check(&"x".repeat(1000)).is_ok());
        assert_eq!(
            check(&"x".repeat(1001)).unwrap_err().to_string(),
            "Prompt exceeds 1000 characters"
        );
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(check("日本語").is_ok());
        assert!(check(&"é".repeat(1000)).is_ok());
    }

    #[test]
    fn test_length_checked_before_ratio() {
        let result = validate(&PromptInput::new("ab", "7:5"), ImageModel::default());
        assert_eq!(result, Err(ValidationError::PromptTooShort));
    }

    #[test]
    fn test_unsupported_ratio() {
        let result = validate(&PromptInput::new("a castle", "7:5"), ImageModel::default());
        assert_eq!(
            result,
            Err(ValidationError::UnsupportedAspectRatio("7:5".to_string()))
        );
    }

    #[test]
    fn test_model_default_and_explicit() {
        let defaulted = validate(
            &PromptInput::new("a castle", "wide"),
            ImageModel::GeminiProImage,
        )
        .unwrap();
        assert_eq!(defaulted.model, ImageModel::GeminiProImage);
        assert_eq!(defaulted.aspect_ratio, AspectRatio::Landscape);

        let explicit = validate(
            &PromptInput::new("a castle", "3:4").with_model("gemini-2.5-flash-image"),
            ImageModel::GeminiProImage,
        )
        .unwrap();
        assert_eq!(explicit.model, ImageModel::GeminiFlashImage);

        let unknown = validate(
            &PromptInput::new("a castle", "3:4").with_model("dall-e-3"),
            ImageModel::default(),
        );
        assert_eq!(
            unknown,
            Err(ValidationError::UnsupportedModel("dall-e-3".to_string()))
        );
    }

    #[test]
    fn test_prompt_is_not_trimmed() {
        let validated = check("  a  ").unwrap();
        assert_eq!(validated.prompt, "  a  ");
    }
}
