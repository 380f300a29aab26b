//! 结果页轮播用的固定文案。

use rand::Rng;

const QUOTES: &[&str] = &[
    "Visham aanal… ningal ningal allandakum!",
    "You're not you when you're hungry. Have a chocolate.",
    "Mood loading… please insert snack to continue.",
    "Ee mukham kandal ariyam: chocolate venam.",
    "Warning: hangry levels approaching critical. Deploy cocoa.",
    "Keep calm and unwrap a bar.",
    "Stomach says yes, face says visham. Listen to the stomach.",
    "A little chocolate a day keeps the visham away.",
];

/// 随机文案选择器。
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotePicker;

impl QuotePicker {
    pub fn all(&self) -> &'static [&'static str] {
        QUOTES
    }

    /// 使用线程本地随机源挑一条。
    pub fn pick(&self) -> &'static str {
        self.pick_with(&mut rand::rng())
    }

    /// 使用注入的随机源挑一条，便于测试复现。
    pub fn pick_with<R: Rng>(&self, rng: &mut R) -> &'static str {
        QUOTES[rng.random_range(0..QUOTES.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pick_returns_known_quote() {
        let picker = QuotePicker;

        for _ in 0..32 {
            assert!(picker.all().contains(&picker.pick()));
        }
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let picker = QuotePicker;
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);

        for _ in 0..8 {
            assert_eq!(picker.pick_with(&mut a), picker.pick_with(&mut b));
        }
    }
}
