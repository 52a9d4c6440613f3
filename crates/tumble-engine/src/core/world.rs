use std::collections::BTreeSet;

use log::{debug, trace, warn};

use crate::api::error::Result;
use crate::api::types::{BodyId, CollisionEvent, ContactKind, ContactPhase, SubscriptionId};
use crate::core::behavior::{Behavior, BoundaryCollisionBehavior, GravityBehavior, ItemSet};
use crate::core::body::{Body, BodyDesc};
use crate::core::boundary::{Boundary, Edge};
use crate::core::math::{Vector2, CONTACT_EPSILON};

type CollisionObserver = Box<dyn FnMut(&CollisionEvent)>;

/// A boundary contact that began this tick while the body was moving into the edge.
#[derive(Debug, Clone, Copy)]
struct Impact {
    body: usize,
    axis: usize,
    /// Normal velocity removed by the constraint pass.
    inbound: f64,
}

/// Per-body scratch state for the constraint phase.
#[derive(Debug, Clone, Copy, Default)]
struct EdgeContacts {
    touching: [bool; 4],
    inbound: [f64; 4],
    /// Contact point on the edge of the boundary that was actually touched.
    points: [Vector2; 4],
}

/// Owns the bodies and behaviors and advances them with a fixed-step pipeline:
/// forces, then position constraints, then velocity modifiers.
pub struct World {
    boundary: Boundary,
    /// Live bodies in insertion order.
    bodies: Vec<Body>,
    behaviors: Vec<Behavior>,
    next_id: u32,
    /// Body pairs in contact at the end of the last tick, smaller id first.
    item_contacts: BTreeSet<(BodyId, BodyId)>,
    events: Vec<CollisionEvent>,
    observers: Vec<(SubscriptionId, CollisionObserver)>,
    next_subscription: u32,
    ticks: u64,
}

impl World {
    /// Create an empty world with no behaviors. Bodies move ballistically until
    /// behaviors are added.
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            bodies: Vec::with_capacity(16),
            behaviors: Vec::new(),
            next_id: 1,
            item_contacts: BTreeSet::new(),
            events: Vec::new(),
            observers: Vec::new(),
            next_subscription: 1,
            ticks: 0,
        }
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    // -- Bodies --

    /// Insert a new active body. Fails with `InvalidSpec` on bad parameters.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyId> {
        desc.validate()?;
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body::from_desc(id, &desc));
        debug!("body {id} added at {} (half {})", desc.position, desc.half_extents);
        Ok(id)
    }

    /// Remove a body from the simulation and from every behavior's item list.
    /// Unknown or already-removed handles are ignored. Returns the removed body, marked inactive.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.bodies.iter().position(|b| b.id == id)?;
        let mut body = self.bodies.remove(idx);
        body.active = false;
        for behavior in &mut self.behaviors {
            behavior.items_mut().remove(id);
        }
        self.item_contacts.retain(|&(a, b)| a != id && b != id);
        debug!("body {id} removed");
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.body(id).is_some()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// The most recently added body whose box contains `point`.
    pub fn body_at(&self, point: Vector2) -> Option<BodyId> {
        self.bodies
            .iter()
            .rev()
            .find(|b| b.aabb().contains(point))
            .map(|b| b.id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    // -- Behaviors --

    pub fn add_behavior(&mut self, behavior: impl Into<Behavior>) {
        let behavior = behavior.into();
        debug!("behavior added: {behavior:?}");
        self.behaviors.push(behavior);
    }

    pub fn clear_behaviors(&mut self) {
        self.behaviors.clear();
        debug!("behaviors cleared");
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    /// Replace the first gravity behavior's vector, or add a gravity behavior
    /// applying to every body if there is none.
    pub fn set_gravity(&mut self, direction: Vector2, magnitude: f64) {
        let existing = self.behaviors.iter_mut().find_map(|b| match b {
            Behavior::Gravity(g) => Some(g),
            _ => None,
        });
        match existing {
            Some(g) => {
                g.direction = direction;
                g.magnitude = magnitude;
            }
            None => self.behaviors.push(GravityBehavior::new(direction, magnitude).into()),
        }
        debug!("gravity set to {direction} x {magnitude}");
    }

    // -- Observers --

    /// Register an observer called once per collision event, after each tick.
    pub fn subscribe_collisions<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&CollisionEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| *s != id);
        self.observers.len() != before
    }

    /// Collision events emitted by the most recent tick.
    pub fn collisions(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // -- Simulation --

    /// Advance the simulation by `dt` seconds. Non-positive or non-finite steps are ignored.
    pub fn tick(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("ignoring tick with invalid dt {dt}");
            return;
        }
        self.events.clear();

        self.integrate(dt);
        let impacts = self.resolve_constraints();
        self.apply_bounce(&impacts);

        for (_, observer) in self.observers.iter_mut() {
            for event in &self.events {
                observer(event);
            }
        }
        self.ticks += 1;
    }

    /// Forces phase: sum gravity per body, then semi-implicit Euler.
    fn integrate(&mut self, dt: f64) {
        for body in self.bodies.iter_mut().filter(|b| b.active) {
            let accel: Vector2 = self
                .behaviors
                .iter()
                .filter_map(|b| match b {
                    Behavior::Gravity(g) if g.items.contains(body.id) => Some(g.acceleration()),
                    _ => None,
                })
                .sum();
            body.velocity += accel * dt;
            body.position += body.velocity * dt;
        }
    }

    /// Constraints phase: item pairs first, then boundary edges. Emits contact transitions
    /// and returns boundary impacts that began this tick.
    fn resolve_constraints(&mut self) -> Vec<Impact> {
        let mut contacts = vec![EdgeContacts::default(); self.bodies.len()];
        let mut pairs = BTreeSet::new();
        let mut saw_boundary = false;

        for behavior in &self.behaviors {
            let Behavior::BoundaryCollision(collision) = behavior else {
                continue;
            };
            if collision.mode.hits_items() {
                resolve_pairs(&mut self.bodies, &collision.items, &mut pairs);
            }
            if collision.mode.hits_boundary() {
                saw_boundary = true;
                for (body, slot) in self.bodies.iter_mut().zip(contacts.iter_mut()) {
                    if body.active && collision.items.contains(body.id) {
                        resolve_boundary(body, collision, slot);
                    }
                }
            }
        }

        self.emit_pair_transitions(pairs);

        let mut impacts = Vec::new();
        for (idx, (body, slot)) in self.bodies.iter_mut().zip(contacts.iter()).enumerate() {
            for edge in Edge::ALL {
                let i = edge.index();
                let (was, now) = (body.touching[i], slot.touching[i]);
                if was == now {
                    continue;
                }
                let phase = if now { ContactPhase::Began } else { ContactPhase::Ended };
                let event = CollisionEvent {
                    body: body.id,
                    kind: ContactKind::Boundary(edge),
                    point: if now { slot.points[i] } else { body.contact_points[i] },
                    phase,
                };
                trace!("{event:?}");
                self.events.push(event);
                if now && slot.inbound[i] != 0.0 {
                    impacts.push(Impact {
                        body: idx,
                        axis: edge_axis(edge),
                        inbound: slot.inbound[i],
                    });
                }
            }
            if saw_boundary {
                body.touching = slot.touching;
                for edge in Edge::ALL {
                    let i = edge.index();
                    if slot.touching[i] {
                        body.contact_points[i] = slot.points[i];
                    }
                }
            } else {
                body.touching = [false; 4];
            }
        }
        impacts
    }

    fn emit_pair_transitions(&mut self, pairs: BTreeSet<(BodyId, BodyId)>) {
        let began: Vec<_> = pairs.difference(&self.item_contacts).copied().collect();
        let ended: Vec<_> = self.item_contacts.difference(&pairs).copied().collect();
        for (phase, list) in [(ContactPhase::Began, began), (ContactPhase::Ended, ended)] {
            for (a, b) in list {
                let point = match (self.body(a), self.body(b)) {
                    (Some(x), Some(y)) => pair_point(x, y),
                    _ => continue,
                };
                for (body, other) in [(a, b), (b, a)] {
                    let event = CollisionEvent {
                        body,
                        kind: ContactKind::Item(other),
                        point,
                        phase,
                    };
                    trace!("{event:?}");
                    self.events.push(event);
                }
            }
        }
        self.item_contacts = pairs;
    }

    /// Velocity-modifier phase: restitution on contacts that began this tick.
    fn apply_bounce(&mut self, impacts: &[Impact]) {
        for behavior in &self.behaviors {
            let Behavior::Bounce(bounce) = behavior else {
                continue;
            };
            for impact in impacts {
                let body = &mut self.bodies[impact.body];
                if !bounce.items.contains(body.id) {
                    continue;
                }
                let e = bounce.elasticity_for(body.elasticity);
                body.velocity[impact.axis] = -e * impact.inbound;
            }
        }
    }
}

fn edge_axis(edge: Edge) -> usize {
    match edge {
        Edge::Left | Edge::Right => 0,
        Edge::Top | Edge::Bottom => 1,
    }
}

/// Clamp `body` inside the boundary, zeroing velocity that points into a touched edge.
fn resolve_boundary(body: &mut Body, collision: &BoundaryCollisionBehavior, slot: &mut EdgeContacts) {
    let min = collision.boundary.min + body.half_extents;
    let max = collision.boundary.max - body.half_extents;
    let mut touched = [false; 4];

    for (axis, lo_edge, hi_edge) in [(0, Edge::Left, Edge::Right), (1, Edge::Bottom, Edge::Top)] {
        let (lo, hi) = (min[axis], max[axis]);
        let p = &mut body.position[axis];
        let v = &mut body.velocity[axis];

        if lo > hi {
            // Wider than the container: pin to the middle, pressed on both sides.
            *p = (lo + hi) * 0.5;
            if *v < 0.0 {
                slot.inbound[lo_edge.index()] = *v;
            } else if *v > 0.0 {
                slot.inbound[hi_edge.index()] = *v;
            }
            *v = 0.0;
            touched[lo_edge.index()] = true;
            touched[hi_edge.index()] = true;
            continue;
        }
        if *p <= lo + CONTACT_EPSILON {
            *p = p.max(lo);
            touched[lo_edge.index()] = true;
            if *v < 0.0 {
                slot.inbound[lo_edge.index()] = *v;
                *v = 0.0;
            }
        }
        if *p >= hi - CONTACT_EPSILON {
            *p = p.min(hi);
            touched[hi_edge.index()] = true;
            if *v > 0.0 {
                slot.inbound[hi_edge.index()] = *v;
                *v = 0.0;
            }
        }
    }

    for edge in Edge::ALL {
        let i = edge.index();
        if touched[i] {
            slot.touching[i] = true;
            slot.points[i] = collision.boundary.contact_point(edge, body.position);
        }
    }
}

/// Pairwise box tests between active bodies in `items`. Overlap is split evenly along the
/// axis of least penetration; approaching bodies exchange normal velocity scaled by the
/// mean elasticity.
fn resolve_pairs(bodies: &mut [Body], items: &ItemSet, pairs: &mut BTreeSet<(BodyId, BodyId)>) {
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.active || !items.contains(a.id) {
            continue;
        }
        for b in tail.iter_mut() {
            if !b.active || !items.contains(b.id) {
                continue;
            }
            let overlap = a.aabb().overlap(&b.aabb());
            if overlap.x < -CONTACT_EPSILON || overlap.y < -CONTACT_EPSILON {
                continue;
            }
            pairs.insert((a.id.min(b.id), a.id.max(b.id)));
            if overlap.x <= 0.0 || overlap.y <= 0.0 {
                continue;
            }

            let axis = if overlap.x < overlap.y { 0 } else { 1 };
            let sign = if b.position[axis] >= a.position[axis] { 1.0 } else { -1.0 };
            let push = overlap[axis] * 0.5 * sign;
            a.position[axis] -= push;
            b.position[axis] += push;

            let (va, vb) = (a.velocity[axis], b.velocity[axis]);
            if (vb - va) * sign < 0.0 {
                let e = (a.elasticity + b.elasticity) * 0.5;
                a.velocity[axis] = vb * e;
                b.velocity[axis] = va * e;
            }
        }
    }
}

/// Center of the region where two boxes meet.
fn pair_point(a: &Body, b: &Body) -> Vector2 {
    let (a, b) = (a.aabb(), b.aabb());
    let lo = a.min().max(b.min());
    let hi = a.max().min(b.max());
    (lo + hi) * 0.5
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::api::error::DynamicsError;
    use crate::core::behavior::{BounceBehavior, CollisionMode};

    const DT: f64 = 1.0 / 60.0;

    fn boundary() -> Boundary {
        Boundary::new(Vector2::ZERO, Vector2::new(300.0, 400.0)).unwrap()
    }

    /// Gravity + boundary collision + bounce, the composite set the demo uses.
    fn composite_world(direction: Vector2, magnitude: f64) -> World {
        let mut world = World::new(boundary());
        world.add_behavior(GravityBehavior::new(direction, magnitude));
        world.add_behavior(BoundaryCollisionBehavior::new(boundary()));
        world.add_behavior(BounceBehavior::new());
        world
    }

    #[test]
    fn box_settles_on_floor() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 0.1);
        let id = world
            .add_body(
                BodyDesc::new(Vector2::splat(40.0))
                    .with_position(Vector2::new(260.0, 50.0))
                    .with_elasticity(0.2),
            )
            .unwrap();

        for _ in 0..240 {
            world.tick(DT);
        }

        let body = world.body(id).unwrap();
        let bottom = body.position.y - body.half_extents.y;
        assert!(bottom.abs() < 1e-6, "bottom edge should rest at 0: {bottom}");
        assert!(body.velocity.y.abs() < 1e-6, "vy should settle: {}", body.velocity.y);
        assert!(body.is_touching(Edge::Bottom));
    }

    #[test]
    fn inelastic_box_comes_to_rest() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        let id = world
            .add_body(BodyDesc::square(40.0).with_position(Vector2::new(150.0, 300.0)))
            .unwrap();

        for _ in 0..120 {
            world.tick(DT);
            let body = world.body(id).unwrap();
            assert!(body.position.y >= 20.0 - 1e-9, "escaped floor: {}", body.position.y);
        }
        for _ in 0..10 {
            world.tick(DT);
            let body = world.body(id).unwrap();
            assert!(body.velocity.y.abs() < 1e-9);
            assert!((body.position.y - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn restitution_scales_normal_velocity() {
        for e in [0.0, 0.2, 0.5, 1.0] {
            let mut world = World::new(boundary());
            world.add_behavior(BoundaryCollisionBehavior::new(boundary()));
            world.add_behavior(BounceBehavior::new());
            let id = world
                .add_body(
                    BodyDesc::square(40.0)
                        .with_position(Vector2::new(150.0, 21.0))
                        .with_velocity(Vector2::new(30.0, -120.0))
                        .with_elasticity(e),
                )
                .unwrap();

            world.tick(DT);

            let body = world.body(id).unwrap();
            assert!((body.velocity.y - e * 120.0).abs() < 1e-9, "e={e}: vy={}", body.velocity.y);
            assert!((body.velocity.x - 30.0).abs() < 1e-9, "tangent untouched");
            assert!((body.position.y - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bounce_override_wins_over_body_elasticity() {
        let mut world = World::new(boundary());
        world.add_behavior(BoundaryCollisionBehavior::new(boundary()));
        world.add_behavior(BounceBehavior::with_elasticity(0.5).unwrap());
        let id = world
            .add_body(
                BodyDesc::square(20.0)
                    .with_position(Vector2::new(288.0, 200.0))
                    .with_velocity(Vector2::new(240.0, 0.0))
                    .with_elasticity(1.0),
            )
            .unwrap();

        world.tick(DT);

        let body = world.body(id).unwrap();
        assert!((body.velocity.x + 120.0).abs() < 1e-9);
        assert!((body.position.x - 290.0).abs() < 1e-9);
    }

    #[test]
    fn no_bounce_behavior_means_inelastic() {
        let mut world = World::new(boundary());
        world.add_behavior(BoundaryCollisionBehavior::new(boundary()));
        let id = world
            .add_body(
                BodyDesc::square(20.0)
                    .with_position(Vector2::new(150.0, 12.0))
                    .with_velocity(Vector2::new(0.0, -300.0))
                    .with_elasticity(1.0),
            )
            .unwrap();

        world.tick(DT);
        assert_eq!(world.body(id).unwrap().velocity.y, 0.0);
    }

    #[test]
    fn one_began_per_contact_episode() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        let id = world
            .add_body(BodyDesc::square(40.0).with_position(Vector2::new(150.0, 300.0)))
            .unwrap();

        let mut bottom_events = Vec::new();
        for _ in 0..300 {
            world.tick(DT);
            bottom_events.extend(
                world
                    .collisions()
                    .iter()
                    .filter(|e| e.body == id && e.edge() == Some(Edge::Bottom))
                    .map(|e| e.phase),
            );
        }
        assert_eq!(bottom_events, vec![ContactPhase::Began]);
    }

    #[test]
    fn bouncing_alternates_began_and_ended() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        world
            .add_body(
                BodyDesc::square(40.0)
                    .with_position(Vector2::new(150.0, 300.0))
                    .with_elasticity(0.6),
            )
            .unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        world.subscribe_collisions(move |e| {
            if e.edge() == Some(Edge::Bottom) {
                sink.borrow_mut().push(e.phase);
            }
        });

        for _ in 0..600 {
            world.tick(DT);
        }

        let log = log.borrow();
        assert!(log.len() >= 3, "expected several bounces, got {log:?}");
        for (i, phase) in log.iter().enumerate() {
            let expected = if i % 2 == 0 { ContactPhase::Began } else { ContactPhase::Ended };
            assert_eq!(*phase, expected, "event {i} in {log:?}");
        }
        assert_eq!(log.last(), Some(&ContactPhase::Began), "should end at rest on the floor");
    }

    #[test]
    fn began_event_reports_edge_point() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        world
            .add_body(BodyDesc::square(20.0).with_position(Vector2::new(100.0, 10.1)))
            .unwrap();
        world.tick(DT);
        let event = world
            .collisions()
            .iter()
            .find(|e| e.began() && e.edge() == Some(Edge::Bottom))
            .copied()
            .unwrap();
        assert_eq!(event.point, Vector2::new(100.0, 0.0));
    }

    #[test]
    fn remove_body_is_idempotent() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        let a = world.add_body(BodyDesc::square(20.0).with_position(Vector2::new(50.0, 50.0))).unwrap();
        let b = world.add_body(BodyDesc::square(20.0).with_position(Vector2::new(150.0, 50.0))).unwrap();

        let removed = world.remove_body(a).unwrap();
        assert!(!removed.active);
        assert!(world.remove_body(a).is_none());
        assert!(world.remove_body(BodyId(999)).is_none());

        assert_eq!(world.len(), 1);
        assert!(world.contains(b));
        world.tick(DT);
        assert!(world.collisions().iter().all(|e| e.body != a));
    }

    #[test]
    fn handles_are_never_reused() {
        let mut world = World::new(boundary());
        let a = world.add_body(BodyDesc::square(10.0)).unwrap();
        world.remove_body(a);
        let b = world.add_body(BodyDesc::square(10.0)).unwrap();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn invalid_body_is_rejected_and_world_stays_usable() {
        let mut world = World::new(boundary());
        let err = world.add_body(BodyDesc::new(Vector2::ZERO)).unwrap_err();
        assert!(matches!(err, DynamicsError::InvalidSpec(_)));
        assert!(world.is_empty());
        assert!(world.add_body(BodyDesc::square(10.0)).is_ok());
    }

    #[test]
    fn removal_strips_listed_items() {
        let mut world = World::new(boundary());
        let a = world.add_body(BodyDesc::square(10.0).with_position(Vector2::new(50.0, 200.0))).unwrap();
        let b = world.add_body(BodyDesc::square(10.0).with_position(Vector2::new(150.0, 200.0))).unwrap();
        world.add_behavior(Behavior::from(GravityBehavior::default()).with_items([a, b]));

        world.remove_body(a);
        assert_eq!(world.behaviors()[0].items(), &ItemSet::Listed(vec![b]));
    }

    #[test]
    fn gravity_only_moves_listed_items() {
        let mut world = World::new(boundary());
        let a = world.add_body(BodyDesc::square(10.0).with_position(Vector2::new(50.0, 200.0))).unwrap();
        let b = world.add_body(BodyDesc::square(10.0).with_position(Vector2::new(150.0, 200.0))).unwrap();
        world.add_behavior(Behavior::from(GravityBehavior::default()).with_items([a]));

        world.tick(DT);
        assert!(world.body(a).unwrap().position.y < 200.0);
        assert_eq!(world.body(b).unwrap().position.y, 200.0);
    }

    #[test]
    fn set_gravity_replaces_existing_vector() {
        let mut world = World::new(boundary());
        world.set_gravity(Vector2::new(0.0, 1.0), 0.1);
        world.set_gravity(Vector2::new(1.0, 0.0), 0.5);
        assert_eq!(world.behaviors().len(), 1);
        match &world.behaviors()[0] {
            Behavior::Gravity(g) => {
                assert_eq!(g.direction, Vector2::new(1.0, 0.0));
                assert!((g.magnitude - 0.5).abs() < 1e-12);
            }
            other => panic!("expected gravity, got {other:?}"),
        }
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        let id = world.add_body(BodyDesc::square(10.0).with_position(Vector2::new(50.0, 200.0))).unwrap();
        world.tick(0.0);
        world.tick(-1.0);
        world.tick(f64::NAN);
        assert_eq!(world.ticks(), 0);
        assert_eq!(world.body(id).unwrap().position.y, 200.0);
    }

    #[test]
    fn ticks_are_deterministic() {
        let run = || {
            let mut world = composite_world(Vector2::new(0.3, -1.0), 0.7);
            world.add_body(BodyDesc::square(30.0).with_position(Vector2::new(100.0, 300.0)).with_elasticity(0.4)).unwrap();
            world.add_body(BodyDesc::square(50.0).with_position(Vector2::new(200.0, 200.0)).with_elasticity(0.9)).unwrap();
            for _ in 0..500 {
                world.tick(DT);
            }
            world.bodies().map(|b| (b.position, b.velocity)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        world.add_body(BodyDesc::square(20.0).with_position(Vector2::new(100.0, 10.1))).unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = world.subscribe_collisions(move |_| *sink.borrow_mut() += 1);
        assert!(world.unsubscribe(sub));
        assert!(!world.unsubscribe(sub));
        world.tick(DT);
        assert!(!world.collisions().is_empty());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn items_mode_exchanges_velocity() {
        let mut world = World::new(boundary());
        world.add_behavior(BoundaryCollisionBehavior::new(boundary()).with_mode(CollisionMode::Everything));
        let a = world
            .add_body(
                BodyDesc::square(20.0)
                    .with_position(Vector2::new(100.0, 200.0))
                    .with_velocity(Vector2::new(60.0, 0.0))
                    .with_elasticity(1.0),
            )
            .unwrap();
        let b = world
            .add_body(
                BodyDesc::square(20.0)
                    .with_position(Vector2::new(121.5, 200.0))
                    .with_velocity(Vector2::new(-60.0, 0.0))
                    .with_elasticity(1.0),
            )
            .unwrap();

        world.tick(DT);

        let (ba, bb) = (world.body(a).unwrap(), world.body(b).unwrap());
        assert!((ba.velocity.x + 60.0).abs() < 1e-9, "a should bounce back: {}", ba.velocity.x);
        assert!((bb.velocity.x - 60.0).abs() < 1e-9, "b should bounce back: {}", bb.velocity.x);
        assert!(bb.position.x - ba.position.x >= 20.0 - 1e-9, "boxes separated");

        let began: Vec<_> = world.collisions().iter().filter(|e| e.began()).collect();
        assert_eq!(began.len(), 2);
        assert!(began.iter().any(|e| e.body == a && e.kind == ContactKind::Item(b)));
        assert!(began.iter().any(|e| e.body == b && e.kind == ContactKind::Item(a)));

        world.tick(DT);
        let ended = world.collisions().iter().filter(|e| e.phase == ContactPhase::Ended).count();
        assert_eq!(ended, 2);
    }

    #[test]
    fn boundaries_mode_ignores_overlapping_items() {
        let mut world = World::new(boundary());
        world.add_behavior(BoundaryCollisionBehavior::new(boundary()));
        let a = world.add_body(BodyDesc::square(20.0).with_position(Vector2::new(100.0, 200.0))).unwrap();
        world.add_body(BodyDesc::square(20.0).with_position(Vector2::new(105.0, 200.0))).unwrap();
        world.tick(DT);
        assert_eq!(world.body(a).unwrap().position.x, 100.0);
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn body_at_prefers_most_recent() {
        let mut world = World::new(boundary());
        let a = world.add_body(BodyDesc::square(40.0).with_position(Vector2::new(100.0, 100.0))).unwrap();
        let b = world.add_body(BodyDesc::square(40.0).with_position(Vector2::new(110.0, 100.0))).unwrap();
        assert_eq!(world.body_at(Vector2::new(105.0, 100.0)), Some(b));
        assert_eq!(world.body_at(Vector2::new(85.0, 100.0)), Some(a));
        assert_eq!(world.body_at(Vector2::new(250.0, 350.0)), None);
    }

    #[test]
    fn contact_points_follow_the_colliding_boundary() {
        let mut world = World::new(boundary());
        let inner = Boundary::new(Vector2::ZERO, Vector2::new(300.0, 200.0)).unwrap();
        world.add_behavior(GravityBehavior::new(Vector2::new(0.0, 1.0), 1.0));
        world.add_behavior(BoundaryCollisionBehavior::new(inner));
        world
            .add_body(BodyDesc::square(20.0).with_position(Vector2::new(100.0, 189.9)))
            .unwrap();

        world.tick(DT);
        let began = world.collisions()[0];
        assert_eq!(began.edge(), Some(Edge::Top));
        assert!(began.began());
        assert_eq!(began.point, Vector2::new(100.0, 200.0));

        world.set_gravity(Vector2::new(0.0, -1.0), 1.0);
        world.tick(DT);
        let ended = world.collisions()[0];
        assert_eq!(ended.edge(), Some(Edge::Top));
        assert_eq!(ended.phase, ContactPhase::Ended);
        assert_eq!(ended.point, Vector2::new(100.0, 200.0));
    }

    #[test]
    fn oversized_body_pinned_to_center() {
        let mut world = composite_world(Vector2::new(0.0, -1.0), 1.0);
        let id = world
            .add_body(BodyDesc::new(Vector2::new(200.0, 10.0)).with_position(Vector2::new(150.0, 100.0)))
            .unwrap();
        world.tick(DT);
        let body = world.body(id).unwrap();
        assert_eq!(body.position.x, 150.0);
        assert!(body.is_touching(Edge::Left) && body.is_touching(Edge::Right));
    }
}
