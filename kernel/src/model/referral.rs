use crate::model::id::UserId;
use shared::config::ReferralConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralPolicy {
    pub threshold: i64,
    pub bonus: i64,
}

impl ReferralPolicy {
    // 累計購入額が閾値以上になったら紹介ボーナスを付与する
    pub fn is_earned(&self, spent: i64) -> bool {
        spent >= self.threshold
    }
}

impl Default for ReferralPolicy {
    fn default() -> Self {
        ReferralConfig::default().into()
    }
}

impl From<ReferralConfig> for ReferralPolicy {
    fn from(value: ReferralConfig) -> Self {
        let ReferralConfig { threshold, bonus } = value;
        Self { threshold, bonus }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralOutcome {
    NoReferrer,
    AlreadyGranted,
    BelowThreshold { spent: i64 },
    Granted { referrer_id: UserId, amount: i64 },
}
