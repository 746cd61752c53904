//! Wallet and Black Market.

use pkos_common::constants::{
    BASE_TRACE_PER_STEP, BASE_UPLOAD_STEP_PCT, BOOSTED_UPLOAD_STEP_PCT, STEALTH_TRACE_SHIELD,
    VPN_TRACE_PER_STEP,
};

/// Session credit balance
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    credits: u64,
}

impl Wallet {
    pub fn credits(&self) -> u64 {
        self.credits
    }

    /// Returns the new balance
    pub fn deposit(&mut self, amount: u64) -> u64 {
        self.credits = self.credits.saturating_add(amount);
        self.credits
    }

    /// Debit `amount` if the balance covers it
    pub fn withdraw(&mut self, amount: u64) -> bool {
        match self.credits.checked_sub(amount) {
            Some(rest) => {
                self.credits = rest;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("Item not found.")]
    NotFound,
    #[error("Already owned.")]
    AlreadyOwned,
    #[error("Insufficient credits. Cost: {0}")]
    InsufficientCredits(u64),
}

/// One purchasable upgrade
#[derive(Debug, Clone)]
pub struct Upgrade {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u64,
    pub desc: &'static str,
    pub owned: bool,
}

/// Upgrade-dependent engine parameters, read on every upload step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeEffects {
    pub trace_per_step: u32,
    pub upload_step_pct: u32,
    /// Trace points absorbed at the start of each operation
    pub trace_shield: u32,
}

impl Default for UpgradeEffects {
    fn default() -> Self {
        Self {
            trace_per_step: BASE_TRACE_PER_STEP,
            upload_step_pct: BASE_UPLOAD_STEP_PCT,
            trace_shield: 0,
        }
    }
}

pub const VPN_PROXY: &str = "vpn_proxy";
pub const BRUTE_FORCE_MK2: &str = "brute_force_mk2";
pub const STEALTH_KIT: &str = "stealth_kit";

#[derive(Debug, Clone)]
pub struct BlackMarket {
    upgrades: Vec<Upgrade>,
}

impl Default for BlackMarket {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackMarket {
    pub fn new() -> Self {
        let item = |id, name, cost, desc| Upgrade {
            id,
            name,
            cost,
            desc,
            owned: false,
        };
        Self {
            upgrades: vec![
                item(VPN_PROXY, "VPN Proxy", 50, "Reduces trace speed by 20%"),
                item(BRUTE_FORCE_MK2, "Brute Force MkII", 100, "Increases crack speed"),
                item(STEALTH_KIT, "Stealth Kit", 200, "Trace starts at -20%"),
            ],
        }
    }

    pub fn owns(&self, id: &str) -> bool {
        self.upgrades.iter().any(|u| u.id == id && u.owned)
    }

    pub fn all_owned(&self) -> bool {
        self.upgrades.iter().all(|u| u.owned)
    }

    /// Debit the wallet and mark the item owned; state is untouched on error
    pub fn buy(&mut self, id: &str, wallet: &mut Wallet) -> Result<&Upgrade, MarketError> {
        let upgrade = self
            .upgrades
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(MarketError::NotFound)?;

        if upgrade.owned {
            return Err(MarketError::AlreadyOwned);
        }
        if !wallet.withdraw(upgrade.cost) {
            return Err(MarketError::InsufficientCredits(upgrade.cost));
        }

        upgrade.owned = true;
        tracing::info!(item = %upgrade.id, cost = upgrade.cost, balance = wallet.credits(), "Upgrade purchased");
        Ok(upgrade)
    }

    /// Listing lines for `market`
    pub fn listing(&self) -> Vec<String> {
        self.upgrades
            .iter()
            .map(|u| {
                let status = if u.owned { "[OWNED]" } else { u.desc };
                format!("{:<15} | {} CR | {}", u.id, u.cost, status)
            })
            .collect()
    }

    pub fn effects(&self) -> UpgradeEffects {
        UpgradeEffects {
            trace_per_step: if self.owns(VPN_PROXY) {
                VPN_TRACE_PER_STEP
            } else {
                BASE_TRACE_PER_STEP
            },
            upload_step_pct: if self.owns(BRUTE_FORCE_MK2) {
                BOOSTED_UPLOAD_STEP_PCT
            } else {
                BASE_UPLOAD_STEP_PCT
            },
            trace_shield: if self.owns(STEALTH_KIT) {
                STEALTH_TRACE_SHIELD
            } else {
                0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_credits_leaves_state() {
        let mut market = BlackMarket::new();
        let mut wallet = Wallet::default();
        wallet.deposit(30);

        let err = market.buy(VPN_PROXY, &mut wallet).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient credits. Cost: 50");
        assert_eq!(wallet.credits(), 30);
        assert!(!market.owns(VPN_PROXY));
    }

    #[test]
    fn test_buy_then_rebuy() {
        let mut market = BlackMarket::new();
        let mut wallet = Wallet::default();
        wallet.deposit(120);

        assert_eq!(market.buy(VPN_PROXY, &mut wallet).unwrap().name, "VPN Proxy");
        assert_eq!(wallet.credits(), 70);
        assert_eq!(market.buy(VPN_PROXY, &mut wallet).unwrap_err(), MarketError::AlreadyOwned);
        assert_eq!(market.buy("cloak", &mut wallet).unwrap_err().to_string(), "Item not found.");
        assert_eq!(wallet.credits(), 70);
    }

    #[test]
    fn test_effects_follow_ownership() {
        let mut market = BlackMarket::new();
        let mut wallet = Wallet::default();
        assert_eq!(market.effects(), UpgradeEffects::default());

        wallet.deposit(350);
        for id in [VPN_PROXY, BRUTE_FORCE_MK2, STEALTH_KIT] {
            market.buy(id, &mut wallet).unwrap();
        }
        assert!(market.all_owned());
        assert_eq!(
            market.effects(),
            UpgradeEffects {
                trace_per_step: 1,
                upload_step_pct: 10,
                trace_shield: 20,
            }
        );
    }

    #[test]
    fn test_listing_marks_owned() {
        let mut market = BlackMarket::new();
        let mut wallet = Wallet::default();
        wallet.deposit(50);
        market.buy(VPN_PROXY, &mut wallet).unwrap();

        let lines = market.listing();
        assert_eq!(lines[0], "vpn_proxy       | 50 CR | [OWNED]");
        assert_eq!(lines[1], "brute_force_mk2 | 100 CR | Increases crack speed");
    }
}
