//! Automatic per-packet control-flag scheduling.
//!
//! Each of the three requests (new mask, send mask, uncompressed) runs on an
//! independent countdown.  Packet 0 and the first `Rt` packets after it are
//! forced to `send_mask = true, send_raw = true` so a receiver joining the
//! stream inside the robustness window can still synchronize; packet 0 does
//! not tick the countdowns, the override packets do.

use crate::encoder::PacketFlags;

/// Countdown state for the three periodic control flags.
#[derive(Clone, Debug)]
pub struct PeriodScheduler {
    new_mask_period: usize,
    send_mask_period: usize,
    raw_period: usize,
    new_mask_left: usize,
    send_mask_left: usize,
    raw_left: usize,
}

impl PeriodScheduler {
    /// Scheduler with all three period limits; every limit must be positive.
    pub fn new(new_mask_period: usize, send_mask_period: usize, raw_period: usize) -> Self {
        debug_assert!(new_mask_period > 0 && send_mask_period > 0 && raw_period > 0);
        Self {
            new_mask_period,
            send_mask_period,
            raw_period,
            new_mask_left: new_mask_period,
            send_mask_left: send_mask_period,
            raw_left: raw_period,
        }
    }

    /// Restart all countdowns as at stream start.
    pub fn reset(&mut self) {
        self.new_mask_left = self.new_mask_period;
        self.send_mask_left = self.send_mask_period;
        self.raw_left = self.raw_period;
    }

    /// Flags for packet `t`, advancing the countdowns.
    pub fn next(&mut self, t: usize, robustness: u8) -> PacketFlags {
        if t == 0 {
            return PacketFlags {
                new_mask: false,
                send_mask: true,
                send_raw: true,
            };
        }

        let send_mask = tick(&mut self.send_mask_left, self.send_mask_period);
        let new_mask = tick(&mut self.new_mask_left, self.new_mask_period);
        let send_raw = tick(&mut self.raw_left, self.raw_period);

        if t <= robustness as usize {
            // Initialization override: counters ticked above regardless.
            PacketFlags {
                new_mask: false,
                send_mask: true,
                send_raw: true,
            }
        } else {
            PacketFlags {
                new_mask,
                send_mask,
                send_raw,
            }
        }
    }
}

fn tick(left: &mut usize, period: usize) -> bool {
    if *left == 1 {
        *left = period;
        true
    } else {
        *left -= 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_zero_forces_sync_without_ticking() {
        let mut sched = PeriodScheduler::new(3, 4, 5);
        let flags = sched.next(0, 0);
        assert!(!flags.new_mask);
        assert!(flags.send_mask);
        assert!(flags.send_raw);
        // First real countdown expiry is unaffected by packet 0.
        for t in 1..3 {
            assert!(!sched.next(t, 0).new_mask, "t = {t}");
        }
        assert!(sched.next(3, 0).new_mask);
    }

    #[test]
    fn countdowns_fire_on_their_period() {
        let mut sched = PeriodScheduler::new(2, 3, 5);
        let fired: Vec<(bool, bool, bool)> = (1..=10)
            .map(|t| {
                let f = sched.next(t, 0);
                (f.new_mask, f.send_mask, f.send_raw)
            })
            .collect();
        let new_mask: Vec<bool> = fired.iter().map(|f| f.0).collect();
        let send_mask: Vec<bool> = fired.iter().map(|f| f.1).collect();
        let send_raw: Vec<bool> = fired.iter().map(|f| f.2).collect();
        assert_eq!(
            new_mask,
            vec![false, true, false, true, false, true, false, true, false, true]
        );
        assert_eq!(
            send_mask,
            vec![false, false, true, false, false, true, false, false, true, false]
        );
        assert_eq!(
            send_raw,
            vec![false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn robustness_window_overrides_flags() {
        let mut sched = PeriodScheduler::new(2, 3, 5);
        for t in 1..=3 {
            let f = sched.next(t, 3);
            assert!(f.send_mask && f.send_raw && !f.new_mask, "t = {t}");
        }
        // Counters kept ticking during the override; pt period 2 fired at
        // t = 2 (hidden) and fires visibly at t = 4.
        let f = sched.next(4, 3);
        assert!(f.new_mask);
    }

    #[test]
    fn reset_restarts_countdowns() {
        let mut sched = PeriodScheduler::new(2, 9, 9);
        sched.next(0, 0);
        sched.next(1, 0);
        sched.reset();
        assert!(!sched.next(1, 0).new_mask);
        assert!(sched.next(2, 0).new_mask);
    }
}
