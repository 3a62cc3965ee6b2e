//! Projectile-to-enemy collision, damage payout and goal contacts.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};
use village_defence_core::{AudioCue, EnemyId, Event, MatchStatus};

use crate::{economy::CoinPickup, World};

impl World {
    /// Matches every collidable projectile against every live enemy.
    ///
    /// Enemies are visited in identifier order. A struck enemy that dies stops
    /// absorbing further projectiles during the same sweep.
    pub(crate) fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let tile_size = self.grid.tile_size();
        let enemy_ids = self.enemies.ids();
        let projectile_ids = self.projectiles.ids();

        for &enemy_id in &enemy_ids {
            for &projectile_id in &projectile_ids {
                let Some(enemy) = self.enemies.get(enemy_id) else {
                    break;
                };
                if !enemy.valid {
                    break;
                }
                let struck_ratio = enemy.reward_ratio;
                let Some(projectile) = self.projectiles.get(projectile_id) else {
                    continue;
                };
                if !projectile.collidable || !enemy.bounds_contain(projectile.position, tile_size) {
                    continue;
                }

                let impact = projectile.position;
                let damage = projectile.damage;
                let slow = projectile.kind.slow();
                let radius = projectile.damage_radius;
                out_events.push(Event::ProjectileImpacted {
                    projectile: projectile_id,
                    enemy: enemy_id,
                    position: impact,
                });

                match radius {
                    None => {
                        self.damage_enemy(enemy_id, damage, struck_ratio, out_events);
                        if let (Some(effect), Some(enemy)) = (slow, self.enemies.get_mut(enemy_id)) {
                            if enemy.valid {
                                enemy.slow_down(effect);
                            }
                        }
                        out_events.push(Event::Audio { cue: AudioCue::Hit });
                    }
                    Some(radius) => {
                        // Splash kills pay out with the struck enemy's ratio.
                        for &other in &enemy_ids {
                            let within = self.enemies.get(other).is_some_and(|candidate| {
                                candidate.valid && candidate.position.distance(impact) <= radius
                            });
                            if within {
                                self.damage_enemy(other, damage, struck_ratio, out_events);
                            }
                        }
                        out_events.push(Event::Audio {
                            cue: AudioCue::Explosion,
                        });
                    }
                }

                if let Some(projectile) = self.projectiles.get_mut(projectile_id) {
                    projectile.on_collide();
                }
            }
        }
    }

    fn damage_enemy(
        &mut self,
        enemy_id: EnemyId,
        amount: f32,
        reward_ratio: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(enemy) = self.enemies.get_mut(enemy_id) else {
            return;
        };
        let killed = enemy.decrease_health(amount);
        let hp = enemy.hp();
        let position = enemy.position;
        out_events.push(Event::EnemyDamaged {
            enemy: enemy_id,
            hp,
        });

        if killed {
            debug!(enemy = enemy_id.get(), "enemy killed");
            out_events.push(Event::EnemyKilled {
                enemy: enemy_id,
                position,
            });
            self.roll_coin(position, reward_ratio, out_events);
        }
    }

    fn roll_coin(&mut self, position: Vec2, reward_ratio: f32, out_events: &mut Vec<Event>) {
        let roll = self.rng.gen_range(0..100u32) as f32 / 100.0;
        if roll > reward_ratio {
            return;
        }
        let toward_right = self.rng.gen_bool(0.5);
        let tile_size = self.grid.tile_size();
        let Some(pickup) = self
            .pickups
            .insert_with(|id| CoinPickup::toss(id, position, toward_right, tile_size))
        else {
            return;
        };
        out_events.push(Event::PickupDropped { pickup, position });
    }

    /// Retires enemies standing on the goal tile and charges the base.
    pub(crate) fn resolve_goal_contacts(&mut self, out_events: &mut Vec<Event>) {
        let Some(goal) = self.goal else {
            return;
        };

        for enemy in self.enemies.iter_mut() {
            if !enemy.valid || !self.grid.tile_contains(goal, enemy.position) {
                continue;
            }
            enemy.valid = false;
            let remaining = self.base.decrease(enemy.damage);
            info!(enemy = enemy.id.get(), remaining, "enemy reached the goal");
            out_events.push(Event::EnemyReachedGoal {
                enemy: enemy.id,
                damage: enemy.damage,
            });
            out_events.push(Event::BaseDamaged {
                amount: enemy.damage,
                remaining,
            });
            out_events.push(Event::Audio {
                cue: AudioCue::BaseHurt,
            });
        }

        if self.base.is_destroyed() && self.status == MatchStatus::InProgress {
            self.status = MatchStatus::Lost;
            info!("base destroyed, match lost");
            out_events.push(Event::MatchLost);
        }
    }
}
