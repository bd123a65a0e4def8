//! Logit masking for constrained decoding

use crate::error::{EvalError, EvalResult};

/// Keep the logits of `legal` token ids and push every other entry to
/// negative infinity.
///
/// Pure: the legal set is a parameter, nothing is captured between calls.
pub fn mask_logits(logits: &[f32], legal: &[usize]) -> EvalResult<Vec<f32>> {
    let mut masked = vec![f32::NEG_INFINITY; logits.len()];

    for &id in legal {
        let logit = logits.get(id).ok_or_else(|| {
            EvalError::contract(format!(
                "legal token id {} outside vocabulary of size {}",
                id,
                logits.len()
            ))
        })?;
        masked[id] = *logit;
    }

    Ok(masked)
}

/// Index of the highest finite logit; ties go to the lowest index.
///
/// Returns `None` when every entry is masked out.
pub fn argmax(logits: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (id, &logit) in logits.iter().enumerate() {
        if logit == f32::NEG_INFINITY || logit.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if logit <= top => {}
            _ => best = Some((id, logit)),
        }
    }

    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_zeroes_illegal_entries() {
        let logits = [5.0, 1.0, 3.0, 9.0];
        let masked = mask_logits(&logits, &[1, 2]).unwrap();

        assert_eq!(masked[0], f32::NEG_INFINITY);
        assert_eq!(masked[1], 1.0);
        assert_eq!(masked[2], 3.0);
        assert_eq!(masked[3], f32::NEG_INFINITY);
    }

    #[test]
    fn test_masked_argmax_ignores_stronger_illegal_token() {
        let logits = [5.0, 1.0, 3.0, 9.0];
        let masked = mask_logits(&logits, &[1, 2]).unwrap();
        assert_eq!(argmax(&logits), Some(3));
        assert_eq!(argmax(&masked), Some(2));
    }

    #[test]
    fn test_mask_rejects_out_of_range_id() {
        assert!(mask_logits(&[0.0, 1.0], &[2]).is_err());
    }

    #[test]
    fn test_argmax_ties_and_empty() {
        assert_eq!(argmax(&[2.0, 2.0, 1.0]), Some(0));
        assert_eq!(argmax(&[f32::NEG_INFINITY; 3]), None);
        assert_eq!(argmax(&[]), None);
    }
}
