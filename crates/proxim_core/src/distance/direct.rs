//! Uncached distance helpers.
//!
//! These never touch the per-tick matrix. They are linear scans meant for
//! small point sets and ad hoc geometry where an O(n²) rebuild would be
//! wasted work.

use crate::entity::Positioned;
use glam::DVec2;
use std::iter::FusedIterator;

/// Euclidean distance between two arbitrary coordinates.
#[inline]
pub fn distance_point_to_point(p1: DVec2, p2: DVec2) -> f64 {
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

/// Squared Euclidean distance between two arbitrary coordinates.
#[inline]
pub fn distance_squared_point_to_point(p1: DVec2, p2: DVec2) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    dx * dx + dy * dy
}

/// Lazy distances from one entity's position to each point, in input order.
pub fn distances_from_entity_to_points<E, I>(entity: &E, points: I) -> DistancesToPoints<I::IntoIter>
where
    E: Positioned + ?Sized,
    I: IntoIterator<Item = DVec2>,
{
    DistancesToPoints {
        origin: entity.position(),
        points: points.into_iter(),
    }
}

/// Lazy distances from each entity's position to a single point, in slice order.
pub fn distances_from_entities_to_point<E: Positioned>(
    entities: &[E],
    point: DVec2,
) -> DistancesToPoint<'_, E> {
    DistancesToPoint {
        entities: entities.iter(),
        point,
    }
}

/// Iterator returned by [`distances_from_entity_to_points`].
///
/// Cloning before consumption gives an independent restart.
#[derive(Debug, Clone)]
pub struct DistancesToPoints<I> {
    origin: DVec2,
    points: I,
}

impl<I: Iterator<Item = DVec2>> Iterator for DistancesToPoints<I> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        let point = self.points.next()?;
        Some(distance_point_to_point(point, self.origin))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

impl<I: ExactSizeIterator<Item = DVec2>> ExactSizeIterator for DistancesToPoints<I> {}

impl<I: FusedIterator<Item = DVec2>> FusedIterator for DistancesToPoints<I> {}

/// Iterator returned by [`distances_from_entities_to_point`].
#[derive(Debug)]
pub struct DistancesToPoint<'a, E> {
    entities: std::slice::Iter<'a, E>,
    point: DVec2,
}

// Manual impl: the slice iterator is cloneable for any `E`.
impl<E> Clone for DistancesToPoint<'_, E> {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities.clone(),
            point: self.point,
        }
    }
}

impl<E: Positioned> Iterator for DistancesToPoint<'_, E> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        let entity = self.entities.next()?;
        Some(distance_point_to_point(entity.position(), self.point))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl<E: Positioned> ExactSizeIterator for DistancesToPoint<'_, E> {}

impl<E: Positioned> FusedIterator for DistancesToPoint<'_, E> {}
