// Per-player battle state: roster, active creature, and the pending hand.
//
// A `Combatant` is created when a player joins a session. Its roster is built
// from the config template with the first creature active and the rest on the
// bench. Exactly one creature is active at all times; `active` caches its
// index and `set_active` is the only place the `is_active` flags change, so
// the two never drift apart.
//
// `pending` holds the hand submitted for the current turn. The resolver
// clears it on both sides after every resolution, whatever the outcome.

use crate::creature::{Creature, CreatureTemplate};
use crate::error::BattleError;
use crate::types::MoveKey;

#[derive(Clone, Debug)]
pub struct Combatant {
    roster: Vec<Creature>,
    active: usize,
    pending: Option<MoveKey>,
}

impl Combatant {
    /// Build a fresh roster of `roster_size` independent creatures (at least
    /// one), index 0 active.
    pub fn new(template: &CreatureTemplate, roster_size: usize) -> Self {
        let roster = (0..roster_size.max(1))
            .map(|i| template.instantiate(i == 0))
            .collect();
        Self {
            roster,
            active: 0,
            pending: None,
        }
    }

    pub fn roster(&self) -> &[Creature] {
        &self.roster
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Creature {
        &self.roster[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Creature {
        &mut self.roster[self.active]
    }

    pub fn pending(&self) -> Option<MoveKey> {
        self.pending
    }

    /// Record the hand for this turn, replacing any earlier one.
    pub fn set_pending(&mut self, key: MoveKey) {
        self.pending = Some(key);
    }

    pub(crate) fn take_pending(&mut self) -> Option<MoveKey> {
        self.pending.take()
    }

    /// Switch to the next creature in roster order that still has hp.
    /// Fainted creatures are skipped; `NoBench` if none is left to bring in.
    pub fn swap(&mut self) -> Result<usize, BattleError> {
        let next = self.next_living().ok_or(BattleError::NoBench)?;
        self.set_active(next);
        Ok(next)
    }

    /// After the active creature faints, bring in the next creature in roster
    /// order that still has hp. Returns the new active index, or `None` if
    /// the whole roster is down (the fainted creature stays active).
    pub(crate) fn replace_fainted(&mut self) -> Option<usize> {
        let next = self.next_living()?;
        self.set_active(next);
        Some(next)
    }

    /// Heal the whole roster, make the first creature active again, and drop
    /// any submitted hand.
    pub fn reset(&mut self) {
        for creature in &mut self.roster {
            creature.hp = creature.max_hp;
        }
        self.set_active(0);
        self.pending = None;
    }

    /// True when every creature in the roster is at 0 hp.
    pub fn is_defeated(&self) -> bool {
        self.roster.iter().all(Creature::is_fainted)
    }

    fn next_living(&self) -> Option<usize> {
        let len = self.roster.len();
        (1..len)
            .map(|offset| (self.active + offset) % len)
            .find(|&i| !self.roster[i].is_fainted())
    }

    fn set_active(&mut self, index: usize) {
        self.roster[self.active].is_active = false;
        self.roster[index].is_active = true;
        self.active = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_count(c: &Combatant) -> usize {
        c.roster().iter().filter(|m| m.is_active).count()
    }

    #[test]
    fn new_roster_has_first_active() {
        let c = Combatant::new(&CreatureTemplate::dragon(), 2);
        assert_eq!(c.roster().len(), 2);
        assert!(c.roster()[0].is_active);
        assert!(!c.roster()[1].is_active);
        assert_eq!(c.active_index(), 0);
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn zero_roster_size_still_yields_one_creature() {
        let c = Combatant::new(&CreatureTemplate::dragon(), 0);
        assert_eq!(c.roster().len(), 1);
        assert!(c.active().is_active);
    }

    #[test]
    fn swap_toggles_between_two() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        assert_eq!(c.swap(), Ok(1));
        assert!(c.roster()[1].is_active);
        assert!(!c.roster()[0].is_active);
        assert_eq!(c.swap(), Ok(0));
        assert_eq!(c.active_index(), 0);
        assert_eq!(active_count(&c), 1);
    }

    #[test]
    fn swap_without_bench_is_rejected() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 1);
        assert_eq!(c.swap(), Err(BattleError::NoBench));
        assert!(c.active().is_active);
    }

    #[test]
    fn swap_leaves_pending_untouched() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        c.set_pending(MoveKey::Rock);
        c.swap().unwrap();
        assert_eq!(c.pending(), Some(MoveKey::Rock));
    }

    #[test]
    fn replace_fainted_skips_fainted_bench() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 3);
        c.roster[0].hp = 0;
        c.roster[1].hp = 0;
        assert_eq!(c.replace_fainted(), Some(2));
        assert!(c.roster()[2].is_active);
        assert_eq!(active_count(&c), 1);
    }

    #[test]
    fn replace_fainted_with_no_survivor_keeps_active() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        c.roster[0].hp = 0;
        c.roster[1].hp = 0;
        assert_eq!(c.replace_fainted(), None);
        assert_eq!(c.active_index(), 0);
        assert!(c.roster()[0].is_active);
        assert!(c.is_defeated());
    }

    #[test]
    fn swap_skips_fainted_bench() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 3);
        c.roster[1].hp = 0;
        assert_eq!(c.swap(), Ok(2));
        assert_eq!(c.swap(), Ok(0));
        assert_eq!(active_count(&c), 1);
    }

    #[test]
    fn swap_onto_only_fainted_bench_is_rejected() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        c.roster[1].hp = 0;
        assert_eq!(c.swap(), Err(BattleError::NoBench));
        assert_eq!(c.active_index(), 0);
        assert!(c.roster()[0].is_active);
    }

    #[test]
    fn reset_restores_full_roster() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        c.roster[0].hp = 0;
        c.roster[1].hp = 35;
        c.swap().unwrap();
        c.set_pending(MoveKey::Scissors);

        c.reset();
        assert!(c.roster().iter().all(|m| m.hp == m.max_hp));
        assert_eq!(c.active_index(), 0);
        assert!(c.roster()[0].is_active);
        assert_eq!(active_count(&c), 1);
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn latest_pending_wins() {
        let mut c = Combatant::new(&CreatureTemplate::dragon(), 2);
        c.set_pending(MoveKey::Rock);
        c.set_pending(MoveKey::Paper);
        assert_eq!(c.pending(), Some(MoveKey::Paper));
        assert_eq!(c.take_pending(), Some(MoveKey::Paper));
        assert_eq!(c.pending(), None);
    }
}
