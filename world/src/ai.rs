//! Enemy behaviour state machine.
//!
//! Patrol, aggro, and return are stepped per frame with no random draws;
//! wander motion is a closed-form drift over the patrol angle so replays
//! stay bit-identical.

use starbreak_core::{AiState, Enemy, PatrolKind, PlayerBody};

fn move_toward(enemy: &mut Enemy, tx: f32, ty: f32, speed: f32, dt: f32) {
    let dx = tx - enemy.x;
    let dy = ty - enemy.y;
    let dist = dx.hypot(dy);
    if dist < 1.0 {
        enemy.vx = 0.0;
        enemy.vy = 0.0;
        return;
    }
    enemy.vx = dx / dist * speed;
    enemy.vy = dy / dist * speed;
    enemy.x += enemy.vx * dt;
    enemy.y += enemy.vy * dt;
}

fn patrol_target(enemy: &Enemy) -> (f32, f32) {
    match enemy.patrol {
        PatrolKind::Circle => (
            enemy.home_x + enemy.patrol_radius * enemy.patrol_angle.cos(),
            enemy.home_y + enemy.patrol_radius * enemy.patrol_angle.sin(),
        ),
        PatrolKind::Line => (
            enemy.home_x + enemy.patrol_radius * enemy.patrol_angle.sin(),
            enemy.home_y,
        ),
        PatrolKind::Wander => (
            enemy.home_x + enemy.patrol_radius * 0.6 * (enemy.patrol_angle * 1.3).cos(),
            enemy.home_y + enemy.patrol_radius * 0.6 * (enemy.patrol_angle * 0.7).sin(),
        ),
    }
}

/// Advances one enemy by `dt` seconds against the current player position.
pub(crate) fn step(enemy: &mut Enemy, player: &PlayerBody, dt: f32) {
    let player_dist = (player.x - enemy.x).hypot(player.y - enemy.y);
    let home_dist = (enemy.home_x - enemy.x).hypot(enemy.home_y - enemy.y);

    match enemy.ai {
        AiState::Patrol => {
            if player_dist < enemy.aggro_range {
                enemy.ai = AiState::Aggro;
                return;
            }
            let rate = if enemy.patrol_radius > 1.0 {
                (enemy.speed * 0.3 / enemy.patrol_radius).min(1.5)
            } else {
                0.5
            };
            enemy.patrol_angle += enemy.patrol_dir * rate * dt;
            let (tx, ty) = patrol_target(enemy);
            move_toward(enemy, tx, ty, enemy.speed * 0.4, dt);
        }
        AiState::Aggro => {
            if player_dist > enemy.disengage_range || home_dist > enemy.leash_range {
                enemy.ai = AiState::Return;
                return;
            }
            // Close until the hulls nearly touch; whether shots land inside
            // attack_range is the combat layer's concern.
            let standoff = enemy.size + player.radius;
            if player_dist > standoff {
                move_toward(enemy, player.x, player.y, enemy.speed, dt);
            } else {
                enemy.vx = 0.0;
                enemy.vy = 0.0;
            }
        }
        AiState::Return => {
            if home_dist <= enemy.return_threshold {
                enemy.ai = AiState::Patrol;
                enemy.vx = 0.0;
                enemy.vy = 0.0;
                return;
            }
            move_toward(enemy, enemy.home_x, enemy.home_y, enemy.speed, dt);
        }
    }
}
