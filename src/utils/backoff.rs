use std::time::Duration;
use rand::Rng;

/// Pick a randomized delay from an inclusive `[min, max]` window of
/// seconds.
pub fn jittered(window: [f64; 2]) -> Duration {
    let [min, max] = window;
    if max <= min {
        return Duration::from_secs_f64(min.max(0.0));
    }
    let secs = rand::thread_rng().gen_range(min..=max);
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_inside_the_window() {
        for _ in 0..100 {
            let delay = jittered([2.0, 5.0]);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(5));
        }
    }

    #[test]
    fn degenerate_window_is_fixed() {
        assert_eq!(jittered([1.0, 1.0]), Duration::from_secs(1));
    }
}
