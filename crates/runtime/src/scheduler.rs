/// Identifier of an installed per-frame hook.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(pub u64);

/// Per-frame hooks run in install order.
///
/// The payload `H` describes what the hook does; the owner interprets it once
/// per frame. Hooks stay installed until removed explicitly.
#[derive(Debug)]
pub struct Scheduler<H> {
    next_id: u64,
    hooks: Vec<(HookId, H)>,
}

impl<H> Default for Scheduler<H> {
    fn default() -> Self {
        Self {
            next_id: 0,
            hooks: Vec::new(),
        }
    }
}

impl<H> Scheduler<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hook(&mut self, hook: H) -> HookId {
        let id = HookId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.hooks.push((id, hook));
        id
    }

    pub fn remove_hook(&mut self, id: HookId) -> Option<H> {
        let pos = self.hooks.iter().position(|(i, _)| *i == id)?;
        Some(self.hooks.remove(pos).1)
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn hooks(&self) -> impl Iterator<Item = (HookId, &H)> {
        self.hooks.iter().map(|(id, h)| (*id, h))
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;

    #[test]
    fn hooks_run_in_install_order() {
        let mut sched = Scheduler::new();
        sched.add_hook("b");
        sched.add_hook("a");
        let order: Vec<_> = sched.hooks().map(|(_, h)| *h).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn remove_only_touches_the_given_hook() {
        let mut sched = Scheduler::new();
        let a = sched.add_hook(1);
        let b = sched.add_hook(2);
        assert_eq!(sched.remove_hook(a), Some(1));
        assert_eq!(sched.remove_hook(a), None);
        assert_eq!(sched.hook_count(), 1);
        assert_eq!(sched.hooks().next().map(|(id, _)| id), Some(b));
    }
}
