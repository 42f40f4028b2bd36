//! Running workload state passed to the selection heuristics.

/// Hours assigned so far, per teacher index.
///
/// Each pipeline stage builds its own context (from scratch or from the
/// candidate it owns); contexts are never shared between candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadContext {
    hours: Vec<u32>,
}

impl WorkloadContext {
    /// Creates an all-zero context for `teacher_count` teachers.
    pub fn new(teacher_count: usize) -> Self {
        Self {
            hours: vec![0; teacher_count],
        }
    }

    /// Builds a context from `(teacher, hours)` pairs.
    pub fn from_assignments<I>(teacher_count: usize, assignments: I) -> Self
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        let mut ctx = Self::new(teacher_count);
        for (teacher, hours) in assignments {
            ctx.add(teacher, hours);
        }
        ctx
    }

    /// Hours currently carried by `teacher`.
    #[inline]
    pub fn hours(&self, teacher: usize) -> u32 {
        self.hours.get(teacher).copied().unwrap_or(0)
    }

    /// Adds hours to a teacher.
    #[inline]
    pub fn add(&mut self, teacher: usize, hours: u32) {
        if let Some(h) = self.hours.get_mut(teacher) {
            *h += hours;
        }
    }

    /// Removes hours from a teacher (saturating at zero).
    #[inline]
    pub fn remove(&mut self, teacher: usize, hours: u32) {
        if let Some(h) = self.hours.get_mut(teacher) {
            *h = h.saturating_sub(hours);
        }
    }

    /// Moves hours from one teacher to another.
    #[inline]
    pub fn transfer(&mut self, from: usize, to: usize, hours: u32) {
        self.remove(from, hours);
        self.add(to, hours);
    }

    /// Teachers carrying any load, with their hours, in index order.
    pub fn loaded(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.hours
            .iter()
            .enumerate()
            .filter(|(_, &h)| h > 0)
            .map(|(t, &h)| (t, h))
    }

    /// Sum over all teachers.
    pub fn total_hours(&self) -> u32 {
        self.hours.iter().sum()
    }
}
