//! Coin ledger, base health and dropped coin pickups.

use std::time::Duration;

use glam::Vec2;
use village_defence_core::{Countdown, PickupId, PickupSnapshot};

const PICKUP_GRAVITY: f32 = 490.0;
const PICKUP_JUMP: Duration = Duration::from_millis(750);
const PICKUP_LIFETIME: Duration = Duration::from_secs(10);
const FLOAT_FREQUENCY: f32 = 4.0;
const FLOAT_AMPLITUDE: f32 = 30.0;

/// Non-negative coin balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    coins: u32,
}

impl Ledger {
    pub(crate) const fn new(coins: u32) -> Self {
        Self { coins }
    }

    pub(crate) const fn balance(&self) -> u32 {
        self.coins
    }

    pub(crate) fn increase(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Removes coins, clamping the balance at zero.
    pub(crate) fn decrease(&mut self, amount: u32) {
        self.coins = self.coins.saturating_sub(amount);
    }
}

/// Health pool of the defended base, clamped at zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BaseDefense {
    health: f32,
}

impl BaseDefense {
    pub(crate) fn new(health: f32) -> Self {
        Self {
            health: health.max(0.0),
        }
    }

    pub(crate) const fn health(&self) -> f32 {
        self.health
    }

    /// Removes health and returns what is left.
    pub(crate) fn decrease(&mut self, amount: f32) -> f32 {
        self.health = (self.health - amount).max(0.0);
        self.health
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Coin tossed out of a killed enemy.
#[derive(Clone, Debug)]
pub(crate) struct CoinPickup {
    pub(crate) id: PickupId,
    pub(crate) position: Vec2,
    velocity: Vec2,
    jump: Countdown,
    lifetime: Countdown,
    floating: bool,
    float_time: f32,
    pub(crate) valid: bool,
}

impl CoinPickup {
    /// Tosses a coin upward and to the left or right.
    pub(crate) fn toss(id: PickupId, position: Vec2, toward_right: bool, tile_size: f32) -> Self {
        let horizontal = if toward_right { 2.0 } else { -2.0 } * tile_size;
        Self {
            id,
            position,
            velocity: Vec2::new(horizontal, -3.0 * tile_size),
            jump: Countdown::one_shot(PICKUP_JUMP),
            lifetime: Countdown::one_shot(PICKUP_LIFETIME),
            floating: false,
            float_time: 0.0,
            valid: true,
        }
    }

    /// Moves the coin and returns `true` when its lifetime just ran out.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        if !self.valid {
            return false;
        }

        let secs = dt.as_secs_f32();
        if self.floating {
            self.float_time += secs;
            let bob = (self.float_time * FLOAT_FREQUENCY).sin() * FLOAT_AMPLITUDE;
            self.velocity = Vec2::new(0.0, bob);
        } else {
            self.velocity.y += PICKUP_GRAVITY * secs;
            if self.jump.on_update(dt) {
                self.floating = true;
            }
        }
        self.position += self.velocity * secs;

        if self.lifetime.on_update(dt) {
            self.valid = false;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self) -> PickupSnapshot {
        PickupSnapshot {
            id: self.id,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrease_clamps_the_balance_at_zero() {
        let mut ledger = Ledger::new(100);
        ledger.decrease(150);
        assert_eq!(ledger.balance(), 0);

        ledger.increase(30);
        assert_eq!(ledger.balance(), 30);
    }

    #[test]
    fn base_health_never_goes_negative() {
        let mut base = BaseDefense::new(3.0);

        assert_eq!(base.decrease(2.0), 1.0);
        assert!(!base.is_destroyed());
        assert_eq!(base.decrease(5.0), 0.0);
        assert!(base.is_destroyed());
    }

    #[test]
    fn tossed_coins_rise_then_float() {
        let mut coin = CoinPickup::toss(PickupId::new(0), Vec2::new(100.0, 100.0), true, 48.0);

        assert!(!coin.advance(Duration::from_millis(100)));
        assert!(coin.position.x > 100.0);
        assert!(coin.position.y < 100.0);

        assert!(!coin.advance(Duration::from_millis(700)));
        let settled_x = coin.position.x;
        assert!(!coin.advance(Duration::from_millis(500)));
        assert_eq!(coin.position.x, settled_x);
    }

    #[test]
    fn coins_expire_after_their_lifetime() {
        let mut coin = CoinPickup::toss(PickupId::new(1), Vec2::ZERO, false, 48.0);

        for _ in 0..99 {
            assert!(!coin.advance(Duration::from_millis(100)));
        }
        assert!(coin.advance(Duration::from_millis(100)));
        assert!(!coin.valid);
        assert!(!coin.advance(Duration::from_millis(100)));
    }
}
