//! Deterministic post-operator repair.
//!
//! Runs on every offspring after mutation and before re-evaluation, in a
//! fixed order:
//!
//! 1. [`unify_group_teachers`]: one teacher per (subject, group).
//! 2. [`rebalance_overloaded`]: move blocks off teachers above their hard
//!    limit.
//! 3. [`promote_top_hours`]: pull blocks toward top-category teachers
//!    still below target.
//! 4. [`resolve_conflicts`]: relocate double-booked teachers and rooms.
//!
//! Each step reports whether it changed the candidate and never fails:
//! a violation with no legal fix stays in place and shows up as a lower
//! fitness. Steps 2 and 3 run once each; one may undo the other.

use std::cmp::Reverse;

use tracing::trace;

use super::chromosome::{Gene, TimetableChromosome};
use super::problem::TimetableProblem;
use crate::dispatching::room_fits;
use crate::models::TeacherCategory;

/// Which repair steps changed the candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub unified: bool,
    pub rebalanced: bool,
    pub promoted: bool,
    pub resolved: bool,
}

impl RepairReport {
    pub fn changed(&self) -> bool {
        self.unified || self.rebalanced || self.promoted || self.resolved
    }
}

/// Runs the four steps in order; invalidates fitness on any change.
pub fn repair(problem: &TimetableProblem, chromosome: &mut TimetableChromosome) -> RepairReport {
    let report = RepairReport {
        unified: unify_group_teachers(problem, chromosome),
        rebalanced: rebalance_overloaded(problem, chromosome),
        promoted: promote_top_hours(problem, chromosome),
        resolved: resolve_conflicts(problem, chromosome),
    };
    if report.changed() {
        chromosome.invalidate();
    }
    trace!(
        unified = report.unified,
        rebalanced = report.rebalanced,
        promoted = report.promoted,
        resolved = report.resolved,
        "repair"
    );
    report
}

/// Gives every block of a (subject, group) the same teacher.
///
/// Choice order: the most frequent current teacher (ties by first
/// appearance) available at every group slot; else the pool teacher
/// available at every slot, ranked by (would exceed ceiling, not
/// salaried, hours); else the least-loaded pool teacher.
pub fn unify_group_teachers(
    problem: &TimetableProblem,
    chromosome: &mut TimetableChromosome,
) -> bool {
    let roster = problem.roster();
    let mut load = problem.workload(chromosome);
    let mut changed = false;

    for members in problem.groups() {
        if members.len() < 2 {
            continue;
        }
        let genes = &chromosome.genes;
        let first = genes[members[0]].teacher;
        if members.iter().all(|&b| genes[b].teacher == first) {
            continue;
        }

        let available_everywhere =
            |t: usize| members.iter().all(|&b| problem.is_available(t, genes[b].slot));

        let mut counts: Vec<(usize, usize)> = Vec::new();
        for &b in members {
            let t = genes[b].teacher;
            match counts.iter_mut().find(|(teacher, _)| *teacher == t) {
                Some((_, n)) => *n += 1,
                None => counts.push((t, 1)),
            }
        }
        counts.sort_by_key(|&(_, n)| Reverse(n));

        let pool = problem.pool_for(members[0]);
        let group_hours: u32 = members.iter().map(|&b| problem.block(b).hours()).sum();

        let selected = counts
            .iter()
            .map(|&(t, _)| t)
            .find(|&t| available_everywhere(t))
            .or_else(|| {
                let mut ranked = pool.to_vec();
                ranked.sort_by_key(|&t| {
                    (
                        load.hours(t) + group_hours > roster.ceiling(t),
                        !roster.category(t).is_salaried(),
                        load.hours(t),
                    )
                });
                ranked.into_iter().find(|&t| available_everywhere(t))
            })
            .or_else(|| pool.iter().copied().min_by_key(|&t| load.hours(t)));
        let Some(selected) = selected else {
            continue;
        };

        for &b in members {
            let old = chromosome.genes[b].teacher;
            if old != selected {
                load.transfer(old, selected, problem.block(b).hours());
                chromosome.genes[b].teacher = selected;
                changed = true;
            }
        }
    }

    changed
}

/// Moves blocks away from teachers above `ceiling × hard_limit_factor`.
///
/// Teachers are handled by excess, largest first; their blocks by
/// duration, longest first. A block moves to the least-loaded eligible
/// (or any other) teacher available at its slot who stays within its own
/// hard limit. Stops per teacher once back under the limit.
pub fn rebalance_overloaded(
    problem: &TimetableProblem,
    chromosome: &mut TimetableChromosome,
) -> bool {
    let roster = problem.roster();
    let mut load = problem.workload(chromosome);
    let mut changed = false;

    let mut overloaded: Vec<(usize, f64)> = load
        .loaded()
        .map(|(t, h)| (t, f64::from(h) - roster.hard_limit(t)))
        .filter(|&(_, excess)| excess > 0.0)
        .collect();
    overloaded.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (donor, _) in overloaded {
        let mut assigned = blocks_of(&chromosome.genes, donor);
        assigned.sort_by_key(|&b| Reverse(problem.block(b).hours()));

        for b in assigned {
            let slot = chromosome.genes[b].slot;
            let hours = problem.block(b).hours();
            let eligible = problem.eligible(b);
            let candidates: Vec<usize> = if eligible.is_empty() {
                (0..problem.teacher_count()).collect()
            } else {
                eligible.to_vec()
            };

            let receiver = candidates
                .into_iter()
                .filter(|&r| {
                    r != donor
                        && problem.is_available(r, slot)
                        && roster.within_hard_limit(r, &load, hours)
                })
                .min_by_key(|&r| load.hours(r));

            if let Some(r) = receiver {
                chromosome.genes[b].teacher = r;
                load.transfer(donor, r, hours);
                changed = true;
                if f64::from(load.hours(donor)) <= roster.hard_limit(donor) {
                    break;
                }
            }
        }
    }

    changed
}

/// Pulls blocks toward top-category teachers below the top target.
///
/// Top teachers are served least-loaded first. Each move takes the
/// longest legal block of the most-loaded non-top donor; a move is legal
/// when the recipient is eligible, available at the slot and within its
/// hard limit, and the donor does not fall below its own target. Stops
/// for a teacher when no legal move remains.
pub fn promote_top_hours(
    problem: &TimetableProblem,
    chromosome: &mut TimetableChromosome,
) -> bool {
    let target = problem.config().top_target_hours;
    if target == 0 {
        return false;
    }
    let roster = problem.roster();

    let mut tops: Vec<usize> = (0..problem.teacher_count())
        .filter(|&t| roster.category(t) == TeacherCategory::Top)
        .collect();
    if tops.is_empty() {
        return false;
    }

    let mut load = problem.workload(chromosome);
    let donors: Vec<usize> = load
        .loaded()
        .map(|(t, _)| t)
        .filter(|&t| roster.category(t) != TeacherCategory::Top)
        .collect();
    if donors.is_empty() {
        return false;
    }

    tops.sort_by_key(|&t| load.hours(t));
    let mut changed = false;

    for top in tops {
        while load.hours(top) < target {
            let mut ranked = donors.clone();
            ranked.sort_by_key(|&d| Reverse(load.hours(d)));

            let mut found = None;
            'donors: for donor in ranked {
                let mut assigned = blocks_of(&chromosome.genes, donor);
                assigned.sort_by_key(|&b| Reverse(problem.block(b).hours()));
                for b in assigned {
                    let hours = problem.block(b).hours();
                    if !problem.is_eligible(b, top)
                        || !problem.is_available(top, chromosome.genes[b].slot)
                        || !roster.within_hard_limit(top, &load, hours)
                    {
                        continue;
                    }
                    if let Some(floor) = roster.target(donor) {
                        if load.hours(donor) < floor + hours {
                            continue;
                        }
                    }
                    found = Some((b, donor));
                    break 'donors;
                }
            }

            let Some((b, donor)) = found else {
                break;
            };
            chromosome.genes[b].teacher = top;
            load.transfer(donor, top, problem.block(b).hours());
            changed = true;
        }
    }

    changed
}

/// Relocates double-booked assignments.
///
/// Genes are scanned in block order; a gene whose teacher is already
/// busy with an earlier gene on an overlapping slot moves to the first
/// same-duration slot where the teacher is available and free (room free
/// too, if possible), else to the first other available, free teacher.
/// A gene whose room is then still taken switches to the first free
/// fitting room, else moves to a slot where its teacher and some fitting
/// room are free, else falls back to the first fitting room.
pub fn resolve_conflicts(
    problem: &TimetableProblem,
    chromosome: &mut TimetableChromosome,
) -> bool {
    let mut changed = false;
    for i in 0..chromosome.genes.len() {
        if teacher_clash_before(problem, &chromosome.genes, i) {
            changed |= relocate_teacher_clash(problem, &mut chromosome.genes, i);
        }
    }
    for i in 0..chromosome.genes.len() {
        if room_clash_before(problem, &chromosome.genes, i) {
            changed |= relocate_room_clash(problem, &mut chromosome.genes, i);
        }
    }
    changed
}

fn relocate_teacher_clash(problem: &TimetableProblem, genes: &mut [Gene], i: usize) -> bool {
    let Gene {
        slot: current,
        room,
        teacher,
    } = genes[i];

    let new_slot = {
        let genes: &[Gene] = genes;
        let by_duration = problem.slots().indices_for(problem.block(i).duration);
        let teacher_free = |s: usize| {
            problem.is_available(teacher, s) && !teacher_busy(problem, genes, i, teacher, s)
        };
        by_duration
            .iter()
            .copied()
            .find(|&s| teacher_free(s) && !room_busy(problem, genes, i, room, s))
            .or_else(|| by_duration.iter().copied().find(|&s| teacher_free(s)))
    };
    if let Some(s) = new_slot {
        genes[i].slot = s;
        return true;
    }

    let new_teacher = {
        let genes: &[Gene] = genes;
        let pool = problem.pool_for(i);
        let others = (0..problem.teacher_count()).filter(|t| !pool.contains(t));
        pool.iter().copied().chain(others).find(|&t| {
            t != teacher
                && problem.is_available(t, current)
                && !teacher_busy(problem, genes, i, t, current)
        })
    };
    if let Some(t) = new_teacher {
        genes[i].teacher = t;
        return true;
    }
    false
}

fn relocate_room_clash(problem: &TimetableProblem, genes: &mut [Gene], i: usize) -> bool {
    let block = problem.block(i);
    let Gene {
        slot: current,
        room,
        teacher,
    } = genes[i];

    let fitting: Vec<usize> = (0..problem.rooms().len())
        .filter(|&r| room_fits(problem.room(r), block))
        .collect();

    if let Some(r) = fitting
        .iter()
        .copied()
        .find(|&r| r != room && !room_busy(problem, genes, i, r, current))
    {
        genes[i].room = r;
        return true;
    }

    for &s in problem.slots().indices_for(block.duration) {
        if !problem.is_available(teacher, s) || teacher_busy(problem, genes, i, teacher, s) {
            continue;
        }
        if let Some(&r) = fitting.iter().find(|&&r| !room_busy(problem, genes, i, r, s)) {
            genes[i].slot = s;
            genes[i].room = r;
            return true;
        }
    }

    match fitting.first() {
        Some(&r) if r != room => {
            genes[i].room = r;
            true
        }
        _ => false,
    }
}

fn blocks_of(genes: &[Gene], teacher: usize) -> Vec<usize> {
    genes
        .iter()
        .enumerate()
        .filter(|(_, g)| g.teacher == teacher)
        .map(|(i, _)| i)
        .collect()
}

/// Whether `teacher` holds a slot overlapping `slot` in any gene but `skip`.
fn teacher_busy(
    problem: &TimetableProblem,
    genes: &[Gene],
    skip: usize,
    teacher: usize,
    slot: usize,
) -> bool {
    genes.iter().enumerate().any(|(j, g)| {
        j != skip && g.teacher == teacher && problem.slots().overlaps(g.slot, slot)
    })
}

fn room_busy(
    problem: &TimetableProblem,
    genes: &[Gene],
    skip: usize,
    room: usize,
    slot: usize,
) -> bool {
    genes.iter().enumerate().any(|(j, g)| {
        j != skip && g.room == room && problem.slots().overlaps(g.slot, slot)
    })
}

fn teacher_clash_before(problem: &TimetableProblem, genes: &[Gene], i: usize) -> bool {
    let g = genes[i];
    genes[..i]
        .iter()
        .any(|o| o.teacher == g.teacher && problem.slots().overlaps(o.slot, g.slot))
}

fn room_clash_before(problem: &TimetableProblem, genes: &[Gene], i: usize) -> bool {
    let g = genes[i];
    genes[..i]
        .iter()
        .any(|o| o.room == g.room && problem.slots().overlaps(o.slot, g.slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::{Day, Room, SlotDuration, Subject, Teacher, TeacherCategory, TimeWindow};
    use crate::testing::{overloaded_problem, slack_problem, weekday_teacher};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn jammed(problem: &TimetableProblem) -> TimetableChromosome {
        // Every block on the first slot of its duration, same room, same teacher.
        let genes = problem
            .blocks()
            .iter()
            .map(|b| Gene::new(problem.slots().indices_for(b.duration)[0], 0, 0))
            .collect();
        TimetableChromosome::new(genes)
    }

    #[test]
    fn test_resolve_conflicts_with_slack() {
        let problem = slack_problem();
        let mut ch = jammed(&problem);
        assert!(problem.evaluate_detailed(&ch).teacher_clashes > 0);

        assert!(resolve_conflicts(&problem, &mut ch));
        let report = problem.evaluate_detailed(&ch);
        assert_eq!(report.teacher_clashes, 0);
        assert_eq!(report.room_clashes, 0);
        assert!(ch.is_valid(&problem));
    }

    #[test]
    fn test_resolve_conflicts_on_random_candidates() {
        let problem = slack_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut ch = problem.create_individual(&mut rng);
            resolve_conflicts(&problem, &mut ch);
            let report = problem.evaluate_detailed(&ch);
            assert_eq!(report.teacher_clashes, 0);
            assert_eq!(report.room_clashes, 0);
        }
    }

    #[test]
    fn test_resolve_conflicts_noop_when_clean() {
        let problem = slack_problem();
        let mut ch = jammed(&problem);
        resolve_conflicts(&problem, &mut ch);
        let before = ch.clone();
        assert!(!resolve_conflicts(&problem, &mut ch));
        assert_eq!(ch, before);
    }

    /// Two teachers free only Monday 07–09, one room, two 2h subjects, both
    /// placed on that slot with the same teacher.
    fn single_slot_problem() -> (TimetableProblem, TimetableChromosome) {
        let teacher = |id: &str| {
            Teacher::new(id, TeacherCategory::Hourly)
                .with_max_hours(10)
                .with_window(Day::Monday, TimeWindow::hours(7, 9))
        };
        let problem = TimetableProblem::new(
            vec![teacher("D1"), teacher("D2")],
            vec![Room::lecture("A1", 30)],
            &[Subject::new("S1", 2, 20), Subject::new("S2", 2, 20)],
            SchedulerConfig::default(),
        )
        .unwrap();
        let monday_seven = problem
            .slots()
            .indices_for(SlotDuration::Two)
            .iter()
            .copied()
            .find(|&s| {
                let slot = problem.slot(s);
                slot.day == Day::Monday && slot.start_hour == 7
            })
            .unwrap();
        let ch = TimetableChromosome::new(vec![
            Gene::new(monday_seven, 0, 0),
            Gene::new(monday_seven, 0, 0),
        ]);
        (problem, ch)
    }

    #[test]
    fn test_teacher_clash_falls_back_to_other_teacher() {
        let (problem, mut ch) = single_slot_problem();
        let slot = ch.genes[0].slot;

        assert!(resolve_conflicts(&problem, &mut ch));
        // No other slot fits either teacher, so the later block changes teacher.
        assert_eq!(ch.genes, vec![Gene::new(slot, 0, 0), Gene::new(slot, 0, 1)]);
        assert_eq!(problem.evaluate_detailed(&ch).teacher_clashes, 0);
    }

    #[test]
    fn test_room_clash_left_when_no_room_or_slot() {
        let (problem, mut ch) = single_slot_problem();
        resolve_conflicts(&problem, &mut ch);
        assert_eq!(problem.evaluate_detailed(&ch).room_clashes, 1);

        // Only one room and one usable slot: the clash stays and nothing changes.
        let before = ch.clone();
        assert!(!resolve_conflicts(&problem, &mut ch));
        assert_eq!(ch, before);
        assert_eq!(problem.evaluate_detailed(&ch).room_clashes, 1);
    }

    #[test]
    fn test_unify_idempotent() {
        let problem = slack_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            let mut ch = problem.create_individual(&mut rng);
            // Split every group across teachers 0 and 1.
            for members in problem.groups() {
                for (k, &b) in members.iter().enumerate() {
                    ch.genes[b].teacher = k % 2;
                }
            }
            unify_group_teachers(&problem, &mut ch);
            for members in problem.groups() {
                let t = ch.genes[members[0]].teacher;
                assert!(members.iter().all(|&b| ch.genes[b].teacher == t));
            }

            let once = ch.clone();
            assert!(!unify_group_teachers(&problem, &mut ch));
            assert_eq!(ch, once);
        }
    }

    #[test]
    fn test_unify_prefers_most_frequent() {
        let problem = TimetableProblem::new(
            vec![
                weekday_teacher("D1", TeacherCategory::Hourly, 30),
                weekday_teacher("D2", TeacherCategory::Hourly, 30),
            ],
            vec![Room::lecture("A1", 30)],
            &[Subject::new("S1", 7, 20)],
            SchedulerConfig::default(),
        )
        .unwrap();
        // 7h → three blocks of one group.
        let mut ch = problem.create_individual(&mut SmallRng::seed_from_u64(42));
        ch.genes[0].teacher = 1;
        ch.genes[1].teacher = 0;
        ch.genes[2].teacher = 1;

        assert!(unify_group_teachers(&problem, &mut ch));
        assert!(ch.genes.iter().all(|g| g.teacher == 1));
    }

    #[test]
    fn test_rebalance_moves_to_receiver() {
        let problem = TimetableProblem::new(
            vec![
                weekday_teacher("D1", TeacherCategory::Hourly, 4),
                weekday_teacher("D2", TeacherCategory::Hourly, 16),
            ],
            vec![Room::lecture("A1", 30)],
            &[Subject::new("S1", 4, 20), Subject::new("S2", 4, 20)],
            SchedulerConfig::default(),
        )
        .unwrap();
        let mut ch = problem.create_individual(&mut SmallRng::seed_from_u64(42));
        for g in &mut ch.genes {
            g.teacher = 0;
        }

        assert!(rebalance_overloaded(&problem, &mut ch));
        let load = problem.workload(&ch);
        assert_eq!(load.hours(0), 4);
        assert_eq!(load.hours(1), 4);
    }

    #[test]
    fn test_rebalance_noop_without_receiver() {
        let problem = overloaded_problem();
        let mut ch = problem.create_individual(&mut SmallRng::seed_from_u64(42));
        assert!(!rebalance_overloaded(&problem, &mut ch));
        assert!(!promote_top_hours(&problem, &mut ch));
        assert_eq!(problem.workload(&ch).hours(0), 12);
    }

    #[test]
    fn test_promote_top_hours() {
        let problem = TimetableProblem::new(
            vec![
                weekday_teacher("TOP", TeacherCategory::Top, 16),
                weekday_teacher("HOUR", TeacherCategory::Hourly, 16),
            ],
            vec![Room::lecture("A1", 30)],
            &[Subject::new("S1", 6, 20), Subject::new("S2", 6, 20)],
            SchedulerConfig::default().with_top_target_hours(9),
        )
        .unwrap();
        let mut ch = problem.create_individual(&mut SmallRng::seed_from_u64(42));
        for g in &mut ch.genes {
            g.teacher = 1;
        }

        assert!(promote_top_hours(&problem, &mut ch));
        let load = problem.workload(&ch);
        assert_eq!(load.hours(0), 9);
        assert_eq!(load.hours(1), 3);
    }

    #[test]
    fn test_promote_respects_donor_target() {
        let problem = TimetableProblem::new(
            vec![
                weekday_teacher("TOP", TeacherCategory::Top, 16),
                weekday_teacher("SEC", TeacherCategory::Second, 30),
            ],
            vec![Room::lecture("A1", 30)],
            &[Subject::new("S1", 6, 20), Subject::new("S2", 6, 20)],
            SchedulerConfig::default().with_second_target_hours(10),
        )
        .unwrap();
        let mut ch = problem.create_individual(&mut SmallRng::seed_from_u64(42));
        for g in &mut ch.genes {
            g.teacher = 1;
        }

        // SEC holds 12h; giving away any 3h block drops it below 10.
        assert!(!promote_top_hours(&problem, &mut ch));
    }

    #[test]
    fn test_repair_invalidates_on_change() {
        let problem = slack_problem();
        let mut ch = jammed(&problem);
        ch.set_fitness(1.0);
        let report = repair(&problem, &mut ch);
        assert!(report.changed());
        assert!(!ch.is_evaluated());

        let mut clean = ch.clone();
        problem.ensure_evaluated(&mut clean);
        let report = repair(&problem, &mut clean);
        if !report.changed() {
            assert!(clean.is_evaluated());
        }
    }
}
