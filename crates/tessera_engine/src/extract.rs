//! Reading a floorplan back out of a solver assignment.

use tessera_arch::{BoardTopology, Rect};
use tessera_common::{HwTaskId, PartitionId, ResourceKind, SlotId};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Subject};
use tessera_milp::{Solution, VarId};

use crate::builder::{FloorplanModel, SlotVars};
use crate::param::{EngineInput, EngineResult, PartitionAllocation, SlotPlacement};

/// Builds the result record from `sol`.
///
/// Each task goes to the partition with the largest assignment value. Only
/// partitions hosting at least one task are reported, packed in slot order.
/// Slot resources are recomputed from the fabric; any disagreement with the
/// modelled counts is reported on `sink`. Reconfiguration time is charged
/// only to tasks sharing a partition, at the platform rate times the
/// partition's allocation.
pub(crate) fn extract(
    input: &EngineInput,
    fm: &FloorplanModel,
    sol: &Solution,
    proven_optimal: bool,
    sink: &DiagnosticSink,
) -> EngineResult {
    let parts = input.num_slots;
    let mut members: Vec<Vec<HwTaskId>> = vec![Vec::new(); parts];
    let mut host = Vec::with_capacity(fm.assign.len());
    for (a, row) in fm.assign.iter().enumerate() {
        let k = row
            .iter()
            .enumerate()
            .max_by(|x, y| sol.value(*x.1).total_cmp(&sol.value(*y.1)))
            .map_or(0, |(k, _)| k);
        members[k].push(HwTaskId::from(a));
        host.push(k);
    }

    let sharing: Vec<bool> = members.iter().map(|m| m.len() > 1).collect();
    let mut packed = vec![None; parts];
    let mut allocations = Vec::new();
    let mut slots = Vec::new();
    for (k, tasks) in members.into_iter().enumerate() {
        if tasks.is_empty() {
            continue;
        }
        let partition = PartitionId::from(allocations.len());
        packed[k] = Some(partition);
        let allocation: Vec<f64> = fm.alloc.iter().map(|row| clean(sol.value(row[k]))).collect();

        if let (Some(board), Some(vars)) = (&input.board, fm.slots.get(k)) {
            slots.push(place(board, vars, SlotId::from(k), &allocation, sol, sink));
        }
        allocations.push(PartitionAllocation {
            partition,
            slot: SlotId::from(k),
            tasks,
            allocation,
        });
    }

    check_disjoint(&slots, sink);

    let task_partition = host
        .iter()
        .map(|&k| packed[k].unwrap_or_else(|| PartitionId::from(k)))
        .collect();
    let rate = input.platform.reconfig_time_per_unit();
    let reconfiguration: Vec<f64> = host
        .iter()
        .map(|&k| {
            if !sharing[k] {
                return 0.0;
            }
            fm.alloc
                .iter()
                .zip(rate)
                .map(|(row, t)| t * clean(sol.value(row[k])))
                .sum::<f64>()
        })
        .collect();
    let max_tasks_per_partition = allocations.iter().map(|a| a.tasks.len()).max().unwrap_or(0);

    EngineResult {
        slots,
        num_partitions: allocations.len(),
        allocations,
        task_partition,
        reconfiguration,
        max_tasks_per_partition,
        objective: sol.objective(),
        proven_optimal,
    }
}

fn place(
    board: &BoardTopology,
    vars: &SlotVars,
    slot: SlotId,
    allocation: &[f64],
    sol: &Solution,
    sink: &DiagnosticSink,
) -> SlotPlacement {
    let x0 = int(sol, vars.x0);
    let x1 = int(sol, vars.x1).max(x0);
    let y = int(sol, vars.y);
    let h = vars.beta.iter().filter(|&&b| sol.is_set(b)).count() as u32;
    let rect = Rect::new(x0, y, x1 - x0, h);
    let rows = board.rows_per_clock_region();
    let site = Rect::new(rect.x, rect.y * rows, rect.w, rect.h * rows);
    let resources = ResourceKind::ALL.map(|kind| board.usable(kind, &rect));

    for kind in ResourceKind::ALL {
        let r = kind.index();
        let realized = f64::from(resources[r]);
        let modelled = sol.eval(&vars.usable[r]);
        if (modelled - realized).abs() > 0.5 {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Solver, 206),
                    format!(
                        "modelled {} count {modelled} differs from the fabric's {realized}",
                        kind.name()
                    ),
                    Subject::Slot(slot),
                )
                .with_note(format!("slot rectangle {rect}")),
            );
        }
        let needed = allocation.get(r).copied().unwrap_or(0.0);
        if realized + 1e-6 < needed {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Solver, 207),
                format!(
                    "slot provides {realized} {} but its partition needs {needed}",
                    kind.name()
                ),
                Subject::Slot(slot),
            ));
        }
    }

    SlotPlacement {
        slot,
        rect,
        site,
        resources,
    }
}

fn check_disjoint(slots: &[SlotPlacement], sink: &DiagnosticSink) {
    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            if a.rect.overlaps(&b.rect) {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Solver, 208),
                    format!("slots {} and {} overlap", a.slot, b.slot),
                    Subject::Slot(b.slot),
                ));
            }
        }
    }
}

fn int(sol: &Solution, var: VarId) -> u32 {
    sol.value(var).round().max(0.0) as u32
}

/// Snaps solver noise around integers.
fn clean(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < 1e-6 {
        r
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_snaps_noise() {
        assert_eq!(clean(9.9999999), 10.0);
        assert_eq!(clean(2.5), 2.5);
        assert_eq!(clean(-1e-9), 0.0);
    }
}
