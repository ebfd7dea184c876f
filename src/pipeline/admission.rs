use super::queue::RequestQueue;
use crate::error::AdmissionError;
use std::time::{Duration, Instant};

/// Rate limit and capacity gate applied to validated submissions.
#[derive(Debug)]
pub struct AdmissionController {
    debounce: Duration,
    last_accepted: Option<Instant>,
}

impl AdmissionController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last_accepted: None,
        }
    }

    /// Rate limit first, then capacity. Does not mutate anything.
    pub fn check(&self, now: Instant, queue: &RequestQueue) -> Result<(), AdmissionError> {
        if let Some(last) = self.last_accepted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.debounce {
                return Err(AdmissionError::RateLimited {
                    retry_after: self.debounce - elapsed,
                });
            }
        }

        if queue.is_full() {
            return Err(AdmissionError::QueueFull {
                capacity: queue.capacity(),
            });
        }

        Ok(())
    }

    /// Only accepted submissions move the debounce window.
    pub fn record_acceptance(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, GenerationRequest, ImageModel, QueueEntry, ValidatedPrompt};
    use chrono::Utc;

    fn fill(queue: &mut RequestQueue, n: usize) {
        for i in 0..n {
            let request = GenerationRequest::from_validated(
                ValidatedPrompt {
                    prompt: format!("prompt {}", i),
                    model: ImageModel::default(),
                    aspect_ratio: AspectRatio::Square,
                },
                Utc::now(),
            );
            queue.push_back(QueueEntry::queued(request)).unwrap();
        }
    }

    #[test]
    fn test_debounce_window() {
        let start = Instant::now();
        let queue = RequestQueue::new(5);
        let mut admission = AdmissionController::new(Duration::from_millis(500));

        assert!(admission.check(start, &queue).is_ok());
        admission.record_acceptance(start);

        let early = start + Duration::from_millis(200);
        assert_eq!(
            admission.check(early, &queue),
            Err(AdmissionError::RateLimited {
                retry_after: Duration::from_millis(300)
            })
        );
        assert!(admission
            .check(start + Duration::from_millis(500), &queue)
            .is_ok());
    }

    #[test]
    fn test_rejection_does_not_move_window() {
        let start = Instant::now();
        let queue = RequestQueue::new(5);
        let mut admission = AdmissionController::new(Duration::from_millis(500));
        admission.record_acceptance(start);

        for ms in [100, 300, 499] {
            assert!(admission
                .check(start + Duration::from_millis(ms), &queue)
                .is_err());
        }
        assert!(admission
            .check(start + Duration::from_millis(501), &queue)
            .is_ok());
    }

    #[test]
    fn test_queue_full() {
        let mut queue = RequestQueue::new(5);
        fill(&mut queue, 5);
        let admission = AdmissionController::new(Duration::ZERO);

        assert_eq!(
            admission.check(Instant::now(), &queue),
            Err(AdmissionError::QueueFull { capacity: 5 })
        );
    }
}
