use std::collections::HashMap;

use crate::{EvalPoint, EvalType, Point};

/// In-memory store of evaluated points.
///
/// Points are keyed by exact coordinates. Inserting a point assigns it the
/// next tag, so tags record insertion order.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    points: Vec<EvalPoint>,
    index: HashMap<Vec<Option<u64>>, usize>,
    next_tag: u64,
}

impl Cache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the cached point with exactly these coordinates.
    #[must_use]
    pub fn get(&self, x: &Point) -> Option<&EvalPoint> {
        self.index.get(&x.key()).map(|&i| &self.points[i])
    }

    /// Inserts a point, or merges its evaluations into an existing entry.
    ///
    /// Returns the stored point with its tag.
    pub fn insert(&mut self, mut point: EvalPoint) -> &EvalPoint {
        let key = point.x().key();
        if let Some(&i) = self.index.get(&key) {
            let stored = &mut self.points[i];
            for et in [EvalType::Blackbox, EvalType::Model] {
                if let Some(eval) = point.eval(et) {
                    stored.set_eval(et, eval.clone());
                }
            }
            return stored;
        }

        point.set_tag(self.next_tag);
        self.next_tag += 1;
        self.index.insert(key, self.points.len());
        self.points.push(point);
        &self.points[self.points.len() - 1]
    }

    /// Returns every cached point matching `predicate`, in insertion order.
    pub fn find(&self, predicate: impl Fn(&EvalPoint) -> bool) -> Vec<&EvalPoint> {
        self.points.iter().filter(|p| predicate(p)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvalPoint> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Eval;

    #[test]
    fn tags_follow_insertion_order() {
        let mut cache = Cache::new();
        assert_eq!(cache.insert(EvalPoint::new(Point::from([1.0]))).tag(), 0);
        assert_eq!(cache.insert(EvalPoint::new(Point::from([2.0]))).tag(), 1);
        assert_eq!(cache.insert(EvalPoint::new(Point::from([1.0]))).tag(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn merges_evaluations() {
        let mut cache = Cache::new();
        let x = Point::from([0.5, 0.5]);
        cache.insert(EvalPoint::new(x.clone()));
        cache.insert(EvalPoint::evaluated(
            x.clone(),
            EvalType::Model,
            Eval::with_fh(vec![Some(1.0)], Some(1.0), Some(0.0)),
        ));

        let stored = cache.get(&x).unwrap();
        assert!(stored.is_eval_ok(EvalType::Model));
        assert!(!stored.is_eval_ok(EvalType::Blackbox));
    }

    #[test]
    fn find_filters_by_predicate() {
        let mut cache = Cache::new();
        for v in [0.0, 1.0, 2.0, 3.0] {
            cache.insert(EvalPoint::new(Point::from([v])));
        }
        let found = cache.find(|p| p.x().get(0).is_some_and(|v| v >= 2.0));
        assert_eq!(found.len(), 2);
    }
}
