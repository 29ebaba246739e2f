// Turn resolution: turn two submitted hands into damage, faints, and a
// per-player report.
//
// `resolve_turn` is called after every hand submission. It does nothing until
// both combatants have a pending hand. Once both are present it:
//
// 1. Judges the hands (`judge.rs`). A draw skips straight to reporting.
// 2. For a decisive clash, looks up the attacker's active creature's move
//    for the hand they threw and subtracts its power from the defender's
//    active creature, clamping at zero.
// 3. If the defender's active creature is at zero hp, brings in the next
//    living creature from the bench. If there is none, the fainted creature
//    stays active and the defender is reported as defeated.
// 4. Builds one `TurnReport` per seat from that seat's perspective, with
//    roster snapshots taken after damage and any forced swap.
// 5. Clears both pending hands.
//
// Callers must serialize calls per session; the function itself holds no
// state between turns.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::creature::Creature;
use crate::judge::{Clash, judge};
use crate::types::{MoveKey, Outcome, Seat};

/// One player's view of a resolved turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub your_hand: MoveKey,
    pub opponent_hand: MoveKey,
    pub outcome: Outcome,
    pub your_roster: Vec<Creature>,
    pub opponent_roster: Vec<Creature>,
}

/// A creature knocked to zero hp this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Faint {
    pub seat: Seat,
    pub fainted: usize,
    /// Roster index brought in to replace it, if any creature was left.
    pub swapped_to: Option<usize>,
}

/// Everything that happened in one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnResolution {
    pub clash: Clash,
    pub damage: u32,
    pub faint: Option<Faint>,
    /// Seat whose entire roster is down after this turn.
    pub defeated: Option<Seat>,
    reports: [TurnReport; 2],
}

impl TurnResolution {
    pub fn report_for(&self, seat: Seat) -> &TurnReport {
        &self.reports[seat.index()]
    }

    pub fn into_reports(self) -> [TurnReport; 2] {
        self.reports
    }
}

/// Resolve the turn if both sides have submitted. Returns `None` (and
/// changes nothing) while either hand is still missing.
pub fn resolve_turn(first: &mut Combatant, second: &mut Combatant) -> Option<TurnResolution> {
    let (first_hand, second_hand) = (first.pending()?, second.pending()?);
    let clash = judge(first_hand, second_hand);

    let mut damage = 0;
    let mut faint = None;
    let mut defeated = None;

    if let Clash::Decisive { attacker } = clash {
        let (atk, def, hand) = match attacker {
            Seat::First => (&*first, &mut *second, first_hand),
            Seat::Second => (&*second, &mut *first, second_hand),
        };
        let power = atk.active().move_for(hand).map_or(0, |m| m.power);
        damage = def.active_mut().take_damage(power);

        // Only a creature knocked out by this hit counts as a new faint.
        if damage > 0 && def.active().is_fainted() {
            let fainted = def.active_index();
            faint = Some(Faint {
                seat: attacker.other(),
                fainted,
                swapped_to: def.replace_fainted(),
            });
        }
        if def.is_defeated() {
            defeated = Some(attacker.other());
        }
    }

    let reports = [
        TurnReport {
            your_hand: first_hand,
            opponent_hand: second_hand,
            outcome: clash.outcome_for(Seat::First),
            your_roster: first.roster().to_vec(),
            opponent_roster: second.roster().to_vec(),
        },
        TurnReport {
            your_hand: second_hand,
            opponent_hand: first_hand,
            outcome: clash.outcome_for(Seat::Second),
            your_roster: second.roster().to_vec(),
            opponent_roster: first.roster().to_vec(),
        },
    ];

    first.take_pending();
    second.take_pending();

    Some(TurnResolution {
        clash,
        damage,
        faint,
        defeated,
        reports,
    })
}
