use rand::Rng;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone)]
pub struct Throttle {
    min: Duration,
    max: Duration,
}

impl Throttle {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    pub async fn pause(&self) {
        if self.is_disabled() {
            return;
        }
        let delay = self.next_delay();
        tracing::debug!("Pausing {:?} before next page", delay);
        sleep(delay).await;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let throttle = Throttle::default();
        for _ in 0..100 {
            let delay = throttle.next_delay();
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn test_swapped_bounds_normalized() {
        let throttle = Throttle::new(Duration::from_secs(2), Duration::from_secs(1));
        let delay = throttle.next_delay();
        assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_disabled_returns_immediately() {
        let throttle = Throttle::disabled();
        assert!(throttle.is_disabled());
        let start = std::time::Instant::now();
        throttle.pause().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
