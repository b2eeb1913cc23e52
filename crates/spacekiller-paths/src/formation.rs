//! Formation layout: start positions and motion paths for squadron members.
//!
//! Every member of a squadron gets its own `MotionPath` generated from the
//! same parameters; members are offset from one another by their hitbox
//! size so they enter the screen in a file.

use glam::Vec2;

use spacekiller_core::constants::*;
use spacekiller_core::enums::MotionKind;
use spacekiller_core::error::FormationError;
use spacekiller_core::path::{MotionPath, Repeat, Waypoint};
use spacekiller_core::types::{Hitbox, Position};

use crate::curves;

/// Motion-type tag together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionSpec {
    /// Horizontal file starting at (x, y), travelling 3 screen widths
    /// in `direction` (+1 right, -1 left).
    LinearX { x: f32, y: f32, direction: f32 },
    /// Vertical file starting at (x, y), travelling 3 screen heights down.
    LinearY { x: f32, y: f32 },
    /// Straight line from `start` to `end`.
    LinearXY { start: Vec2, end: Vec2 },
    /// Enter at (x, y) then sweep a half circle below the top edge.
    SemiCircle { x: f32, y: f32 },
    BezierSpline { control_points: Vec<Vec2> },
    CatmullRomSpline { control_points: Vec<Vec2> },
    /// Seven-member chevron, centre leading.
    ArrowUp,
    /// Seven-member chevron, wings leading.
    ArrowDown,
    /// Single boss: descend, then patrol left and right forever.
    BossMove,
}

/// Where a member starts and the path it follows.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub start: Position,
    pub path: MotionPath,
}

impl MotionSpec {
    pub fn kind(&self) -> MotionKind {
        match self {
            MotionSpec::LinearX { .. } => MotionKind::LinearX,
            MotionSpec::LinearY { .. } => MotionKind::LinearY,
            MotionSpec::LinearXY { .. } => MotionKind::LinearXY,
            MotionSpec::SemiCircle { .. } => MotionKind::SemiCircle,
            MotionSpec::BezierSpline { .. } => MotionKind::BezierSpline,
            MotionSpec::CatmullRomSpline { .. } => MotionKind::CatmullRomSpline,
            MotionSpec::ArrowUp => MotionKind::ArrowUp,
            MotionSpec::ArrowDown => MotionKind::ArrowDown,
            MotionSpec::BossMove => MotionKind::BossMove,
        }
    }

    /// Member count this formation requires, if it has a fixed shape.
    pub fn required_members(&self) -> Option<usize> {
        match self {
            MotionSpec::ArrowUp | MotionSpec::ArrowDown => Some(ARROW_MEMBERS),
            MotionSpec::BossMove => Some(1),
            _ => None,
        }
    }
}

/// Lay out one placement per member hitbox.
pub fn form(
    spec: &MotionSpec,
    velocity: f32,
    members: &[Hitbox],
) -> Result<Vec<Placement>, FormationError> {
    validate(spec, velocity, members)?;

    let placements = match spec {
        MotionSpec::LinearX { x, y, direction } => linear_x(*x, *y, *direction, velocity, members),
        MotionSpec::LinearY { x, y } => linear_y(*x, *y, velocity, members),
        MotionSpec::LinearXY { start, end } => linear_xy(*start, *end, velocity, members),
        MotionSpec::SemiCircle { x, y } => semi_circle(*x, *y, velocity, members),
        MotionSpec::BezierSpline { control_points } => {
            let points = curves::sample(SPLINE_SAMPLES, |t| curves::bezier(control_points, t));
            along_curve(&points, control_points[0], velocity, members)
        }
        MotionSpec::CatmullRomSpline { control_points } => {
            let points =
                curves::sample(SPLINE_SAMPLES, |t| curves::catmull_rom(control_points, t));
            along_curve(&points, control_points[0], velocity, members)
        }
        MotionSpec::ArrowUp => arrow(false, velocity, members[0]),
        MotionSpec::ArrowDown => arrow(true, velocity, members[0]),
        MotionSpec::BossMove => vec![boss_move(velocity, members[0])],
    };
    Ok(placements)
}

fn validate(spec: &MotionSpec, velocity: f32, members: &[Hitbox]) -> Result<(), FormationError> {
    let motion = spec.kind();
    if velocity.is_nan() || velocity <= 0.0 {
        return Err(FormationError::NonPositiveVelocity { velocity });
    }
    if let Some(expected) = spec.required_members() {
        if members.len() != expected {
            return Err(FormationError::MemberCount {
                motion,
                expected,
                actual: members.len(),
            });
        }
    }
    if members.is_empty() {
        return Err(FormationError::Empty { motion });
    }
    if let MotionSpec::BezierSpline { control_points }
    | MotionSpec::CatmullRomSpline { control_points } = spec
    {
        if control_points.len() < SPLINE_MIN_CONTROL_POINTS {
            return Err(FormationError::ControlPoints {
                motion,
                minimum: SPLINE_MIN_CONTROL_POINTS,
                actual: control_points.len(),
            });
        }
    }
    Ok(())
}

fn single_leg(start: Position, target: Position, duration: f32) -> Placement {
    Placement {
        start,
        path: MotionPath {
            origin: start,
            waypoints: vec![Waypoint::new(target, duration)],
            repeat: Repeat::Once,
        },
    }
}

fn linear_x(x: f32, y: f32, direction: f32, velocity: f32, members: &[Hitbox]) -> Vec<Placement> {
    let travel = TRAVERSAL_SCREENS * SCREEN_WIDTH;
    members
        .iter()
        .enumerate()
        .map(|(i, hitbox)| {
            let start = Position::new(x - direction * i as f32 * hitbox.width, y);
            let target = Position::new(start.x + direction * travel, y);
            single_leg(start, target, travel / velocity)
        })
        .collect()
}

fn linear_y(x: f32, y: f32, velocity: f32, members: &[Hitbox]) -> Vec<Placement> {
    let travel = TRAVERSAL_SCREENS * SCREEN_HEIGHT;
    members
        .iter()
        .enumerate()
        .map(|(i, hitbox)| {
            let start = Position::new(x, y + i as f32 * hitbox.height);
            let target = Position::new(x, start.y - travel);
            single_leg(start, target, travel / velocity)
        })
        .collect()
}

fn linear_xy(start: Vec2, end: Vec2, velocity: f32, members: &[Hitbox]) -> Vec<Placement> {
    // Every member shares the leader's duration, so the file tightens
    // as it converges on `end`.
    let duration = start.distance(end) / velocity;
    members
        .iter()
        .enumerate()
        .map(|(i, hitbox)| {
            let from = Position::new(start.x, start.y + i as f32 * hitbox.height);
            single_leg(from, Position::from(end), duration)
        })
        .collect()
}

fn semi_circle(x: f32, y: f32, velocity: f32, members: &[Hitbox]) -> Vec<Placement> {
    let center = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT);
    let radius = Vec2::new(-SCREEN_WIDTH / 2.0, 0.0);
    let arc: Vec<Position> = curves::semi_circle(center, radius, SEMI_CIRCLE_SAMPLES)
        .into_iter()
        .map(Position::from)
        .collect();
    members
        .iter()
        .enumerate()
        .map(|(i, hitbox)| {
            let start = Position::new(x, y + 2.0 * i as f32 * hitbox.height);
            Placement {
                start,
                path: MotionPath::through(start, &arc, velocity),
            }
        })
        .collect()
}

fn along_curve(points: &[Vec2], first: Vec2, velocity: f32, members: &[Hitbox]) -> Vec<Placement> {
    let samples: Vec<Position> = points.iter().copied().map(Position::from).collect();
    members
        .iter()
        .enumerate()
        .map(|(i, hitbox)| {
            let start = Position::new(first.x, SCREEN_HEIGHT + i as f32 * hitbox.height);
            Placement {
                start,
                path: MotionPath::through(start, &samples, velocity),
            }
        })
        .collect()
}

/// Seven members in a chevron above the screen. `wings_leading` puts the
/// outer members lowest (a V), otherwise the centre member leads.
fn arrow(wings_leading: bool, velocity: f32, hitbox: Hitbox) -> Vec<Placement> {
    let travel = TRAVERSAL_SCREENS * SCREEN_HEIGHT;
    let center_x = SCREEN_WIDTH / 2.0 - hitbox.width / 2.0;
    let half = (ARROW_MEMBERS / 2) as i32;
    (-half..=half)
        .map(|offset| {
            let rank = offset.unsigned_abs() as f32;
            let depth = if wings_leading {
                half as f32 - rank
            } else {
                rank
            };
            let start = Position::new(
                center_x + offset as f32 * hitbox.width * ARROW_SPACING,
                SCREEN_HEIGHT + depth * hitbox.height * ARROW_SPACING,
            );
            let target = Position::new(start.x, start.y - travel);
            single_leg(start, target, travel / velocity)
        })
        .collect()
}

fn boss_move(velocity: f32, hitbox: Hitbox) -> Placement {
    let (w, h) = (hitbox.width, hitbox.height);
    let start = Position::new(SCREEN_WIDTH / 2.0 - w / 2.0, SCREEN_HEIGHT + 10.0);
    let patrol_y = SCREEN_HEIGHT - h - BOSS_TOP_MARGIN;
    let waypoints = vec![
        Waypoint::new(Position::new(start.x, patrol_y), (h + 30.0) / velocity),
        Waypoint::new(Position::new(-w, patrol_y), ((SCREEN_WIDTH + w) / 2.0) / velocity)
            .with_delay(BOSS_LEG_DELAY),
        Waypoint::new(
            Position::new(SCREEN_WIDTH / 2.0 - w / 2.0, patrol_y),
            (SCREEN_WIDTH + w / 2.0) / velocity,
        )
        .with_delay(BOSS_LEG_DELAY),
        Waypoint::new(Position::new(SCREEN_WIDTH, patrol_y), (SCREEN_WIDTH + w / 2.0) / velocity)
            .with_delay(BOSS_LEG_DELAY),
    ];
    Placement {
        start,
        path: MotionPath {
            origin: start,
            waypoints,
            repeat: Repeat::Yoyo {
                delay: BOSS_REPEAT_DELAY,
            },
        },
    }
}
