//! # Pursuit
//!
//! Moves a pursuer along routes towards a (possibly moving) quarry.
//!
//! The pursuer walks one waypoint at a time at a fixed speed. Whenever it has
//! no waypoint it asks its [`RouteSource`] for a fresh route. Every
//! `repath_interval` seconds the remaining queue is dropped, so the pursuer
//! finishes its current leg and then plans again from where it stands.

use crate::{config, AStarPathfinder, Point, Route};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Anything that can plan a route between two points.
pub trait RouteSource {
    fn route(&self, from: Point, to: Point) -> Route;
}

impl RouteSource for AStarPathfinder<'_> {
    fn route(&self, from: Point, to: Point) -> Route {
        self.find_route(from, to)
    }
}

/// What happened during one [`Pursuer::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PursuitStep {
    /// A new route was planned; holds its waypoint count and whether it is complete
    Repathed { waypoints: usize, complete: bool },
    /// The re-path interval elapsed; queued waypoints were dropped
    QueueDropped { dropped: usize },
    /// Moved towards the current waypoint
    Advanced { position: Point, remaining: f32 },
    /// Arrived at a waypoint and took the next one (if any)
    ReachedWaypoint { at: Point, next: Option<Point> },
    /// No route is available and the pursuer stands still
    Waiting,
}

/// An agent chasing a quarry through the maze.
///
/// # Examples
///
/// ```
/// use mazechase::{AStarPathfinder, PassabilityMap, Point, Position, Pursuer, PursuitStep, Rect};
///
/// let mut map = PassabilityMap::new();
/// map.carve_rect(Rect::from_corners(Position::new(0, 0), Position::new(4, 0)));
/// let pathfinder = AStarPathfinder::new(&map, Position::new(2, 2));
///
/// let mut pursuer = Pursuer::new(Point::new(0.0, 0.0), 4.0);
/// let step = pursuer.update(0.1, Point::new(4.0, 0.0), &pathfinder);
/// assert!(matches!(step, PursuitStep::Repathed { complete: true, .. }));
/// assert_eq!(pursuer.target(), Some(Point::new(4.0, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pursuer {
    position: Point,
    /// Cells per second
    speed: f32,
    /// Seconds between queue drops
    repath_interval: f32,
    queue: VecDeque<Point>,
    target: Option<Point>,
    timer: f32,
}

impl Pursuer {
    /// Creates a pursuer with the default re-path interval. Negative speeds
    /// are taken by magnitude.
    pub fn new(position: Point, speed: f32) -> Self {
        Self {
            position,
            speed: speed.abs(),
            repath_interval: config::DEFAULT_REPATH_INTERVAL,
            queue: VecDeque::new(),
            target: None,
            timer: 0.0,
        }
    }

    /// Overrides the re-path interval.
    pub fn with_repath_interval(mut self, seconds: f32) -> Self {
        self.repath_interval = seconds.max(0.0);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Waypoint currently being walked to.
    pub fn target(&self) -> Option<Point> {
        self.target
    }

    /// Waypoints queued after the current target.
    pub fn queued(&self) -> impl Iterator<Item = &Point> {
        self.queue.iter()
    }

    /// Advances the pursuer by `dt` seconds towards `quarry`.
    pub fn update<S: RouteSource + ?Sized>(
        &mut self,
        dt: f32,
        quarry: Point,
        source: &S,
    ) -> PursuitStep {
        self.timer += dt.max(0.0);

        let Some(target) = self.target else {
            self.queue.clear();
            self.timer = 0.0;
            return self.repath(quarry, source);
        };

        if self.timer > self.repath_interval {
            let dropped = self.queue.len();
            self.queue.clear();
            self.timer = 0.0;
            return PursuitStep::QueueDropped { dropped };
        }

        if self.position != target {
            self.position = move_towards(self.position, target, self.speed * dt);
            PursuitStep::Advanced {
                position: self.position,
                remaining: self.position.distance(target),
            }
        } else {
            self.target = self.queue.pop_front();
            PursuitStep::ReachedWaypoint {
                at: target,
                next: self.target,
            }
        }
    }

    fn repath<S: RouteSource + ?Sized>(&mut self, quarry: Point, source: &S) -> PursuitStep {
        let route = source.route(self.position, quarry);
        let complete = route.reached_goal();
        self.queue = route.into_waypoints().into();
        self.target = self.queue.pop_front();

        match self.target {
            Some(target) => {
                debug!(
                    "Pursuer at {} planned {} waypoints towards {}, first {}",
                    self.position,
                    self.queue.len() + 1,
                    quarry,
                    target
                );
                PursuitStep::Repathed {
                    waypoints: self.queue.len() + 1,
                    complete,
                }
            }
            None => PursuitStep::Waiting,
        }
    }
}

/// Moves `from` towards `to` by at most `max_delta`, landing exactly on `to`
/// when within reach.
pub fn move_towards(from: Point, to: Point, max_delta: f32) -> Point {
    let distance = from.distance(to);
    if distance <= max_delta || distance == 0.0 {
        return to;
    }
    let scale = max_delta / distance;
    from.translate((to.x - from.x) * scale, (to.y - from.y) * scale)
}
