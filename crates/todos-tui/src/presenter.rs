//! UI state, key and mouse handling.
//!
//! The presenter never edits its task cache by hand: every successful
//! mutation is followed by a full `get_all`, and a failed call leaves the
//! cache as it was and reports on the status line. Each store call runs
//! inside a span named after the operation, carrying the task id when
//! there is one.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use tracing::{debug, info, info_span, warn};

use todos_core::{PriorityFilter, Task, TaskPriority};
use todos_store::{StoreError, TaskStore};

/// Which panel receives key input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// Description input.
    #[default]
    Input,
    /// High/Medium/Low selector.
    Priority,
    /// Add button.
    Add,
    /// Priority filter list.
    Filter,
    /// Task table.
    Table,
}

impl Focus {
    const ORDER: [Self; 5] = [
        Self::Input,
        Self::Priority,
        Self::Add,
        Self::Filter,
        Self::Table,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next panel in Tab order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    /// Previous panel in Tab order, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether the focus is inside the "New" panel.
    pub fn in_new_panel(self) -> bool {
        matches!(self, Self::Input | Self::Priority | Self::Add)
    }
}

/// What the event loop should do after a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Keep drawing and reading events.
    Continue,
    /// Leave the event loop.
    Quit,
}

/// Where a mouse event landed, as resolved by [`crate::ui::target_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Description input.
    Input,
    /// Priority selector, with the option under the pointer.
    Priority(Option<TaskPriority>),
    /// Add button.
    Add,
    /// Filter list, with the entry under the pointer.
    Filter(Option<PriorityFilter>),
    /// Task table, with the index into [`Presenter::visible`] under the pointer.
    Table(Option<usize>),
}

impl Target {
    fn focus(self) -> Focus {
        match self {
            Self::Input => Focus::Input,
            Self::Priority(_) => Focus::Priority,
            Self::Add => Focus::Add,
            Self::Filter(_) => Focus::Filter,
            Self::Table(_) => Focus::Table,
        }
    }
}

/// One line of feedback under the panels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text.
    pub text: String,
    /// Drawn in red when set, green otherwise.
    pub is_error: bool,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Interactive state over a [`TaskStore`].
pub struct Presenter<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    filter: PriorityFilter,
    draft: String,
    priority: TaskPriority,
    focus: Focus,
    selected: usize,
    status: Option<StatusMessage>,
    show_usage: bool,
}

impl<S: TaskStore> Presenter<S> {
    /// Load the initial task list. A failing first load is returned, since
    /// there is nothing to fall back to.
    pub fn new(store: S, filter: PriorityFilter) -> Result<Self, StoreError> {
        let tasks = store.get_all()?;
        info!(count = tasks.len(), filter = %filter, "presenter loaded");
        Ok(Self {
            store,
            tasks,
            filter,
            draft: String::new(),
            priority: TaskPriority::default(),
            focus: Focus::default(),
            selected: 0,
            status: None,
            show_usage: true,
        })
    }

    /// Toggle the usage panel.
    #[must_use]
    pub fn with_usage(mut self, show: bool) -> Self {
        self.show_usage = show;
        self
    }

    /// Every cached task, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Cached tasks that pass the active filter, in display order.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// The highlighted row's task, if the table has rows.
    pub fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    /// Active display filter.
    pub fn filter(&self) -> PriorityFilter {
        self.filter
    }

    /// Text typed into the input so far.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Priority the next task will get.
    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Panel receiving keys.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Index into [`Presenter::visible`].
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Feedback from the last action.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether the key binding panel is drawn.
    pub fn show_usage(&self) -> bool {
        self.show_usage
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hand the store back, e.g. to close it on exit.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Apply one key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::Continue;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Action::Continue;
            }
            KeyCode::Char('q') if self.focus != Focus::Input => return Action::Quit,
            _ => {}
        }

        match self.focus {
            Focus::Input => self.on_input_key(key),
            Focus::Priority => self.on_priority_key(key.code),
            Focus::Add => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.submit();
                }
            }
            Focus::Filter => self.on_filter_key(key.code),
            Focus::Table => self.on_table_key(key.code),
        }
        Action::Continue
    }

    /// Apply one mouse event that landed on `target`.
    ///
    /// A left click focuses the panel under the pointer and acts on the
    /// option, filter entry or row there. The wheel moves the table or
    /// filter selection without changing focus.
    pub fn handle_mouse(&mut self, kind: MouseEventKind, target: Target) {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(target),
            MouseEventKind::ScrollUp => self.scroll(target, -1),
            MouseEventKind::ScrollDown => self.scroll(target, 1),
            _ => {}
        }
    }

    fn click(&mut self, target: Target) {
        self.focus = target.focus();
        match target {
            Target::Priority(Some(priority)) => self.priority = priority,
            Target::Add => self.submit(),
            Target::Filter(Some(filter)) => self.set_filter(filter),
            Target::Table(Some(row)) => {
                self.selected = row;
                self.clamp_selection();
            }
            _ => {}
        }
    }

    fn scroll(&mut self, target: Target, delta: isize) {
        match target {
            Target::Table(_) => self.move_selection(delta),
            Target::Filter(_) => {
                self.on_filter_key(if delta < 0 { KeyCode::Up } else { KeyCode::Down });
            }
            _ => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                let _ = self.draft.pop();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.draft.push(c);
            }
            _ => {}
        }
    }

    fn on_priority_key(&mut self, code: KeyCode) {
        self.priority = match code {
            KeyCode::Left => self.priority.prev(),
            KeyCode::Right => self.priority.next(),
            KeyCode::Char('h') => TaskPriority::High,
            KeyCode::Char('m') => TaskPriority::Medium,
            KeyCode::Char('l') => TaskPriority::Low,
            _ => return,
        };
    }

    fn on_filter_key(&mut self, code: KeyCode) {
        let current = PriorityFilter::ALL
            .iter()
            .position(|f| *f == self.filter)
            .unwrap_or(0);
        let next = match code {
            KeyCode::Up | KeyCode::Char('k') => current.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => (current + 1).min(PriorityFilter::ALL.len() - 1),
            _ => return,
        };
        self.set_filter(PriorityFilter::ALL[next]);
    }

    fn on_table_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            _ => {}
        }
    }

    /// Change the display filter. Never touches the store.
    pub fn set_filter(&mut self, filter: PriorityFilter) {
        if filter != self.filter {
            debug!(from = %self.filter, to = %filter, "filter changed");
            self.filter = filter;
            self.selected = 0;
        }
        self.clamp_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    /// Add the draft as a new task. Blank drafts are ignored without a
    /// store call.
    pub fn submit(&mut self) {
        if self.draft.trim().is_empty() {
            return;
        }
        let _span = info_span!("add", priority = %self.priority).entered();
        match self.store.add(&self.draft, self.priority) {
            Ok(task) => {
                self.draft.clear();
                self.status = Some(StatusMessage::info(format!(
                    "Added \"{}\" ({})",
                    task.description, task.priority
                )));
                self.refresh();
            }
            Err(e) => self.report("add", &e),
        }
    }

    /// Flip the selected task between Pending and Done.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        let _span = info_span!("toggle", task_id = %id).entered();
        match self.store.toggle(id) {
            Ok(Some(task)) => {
                self.status = Some(StatusMessage::info(format!(
                    "\"{}\" is now {}",
                    task.description, task.status
                )));
                self.refresh();
            }
            Ok(None) => {
                self.status = Some(StatusMessage::info(format!("Task {id} no longer exists")));
                self.refresh();
            }
            Err(e) => self.report("toggle", &e),
        }
    }

    /// Delete the selected task.
    pub fn remove_selected(&mut self) {
        let Some((id, description)) = self
            .selected_task()
            .map(|t| (t.id, t.description.clone()))
        else {
            return;
        };
        let _span = info_span!("remove", task_id = %id).entered();
        match self.store.remove(id) {
            Ok(removed) => {
                if removed {
                    self.status = Some(StatusMessage::info(format!("Removed \"{description}\"")));
                }
                self.refresh();
            }
            Err(e) => self.report("remove", &e),
        }
    }

    /// Replace the cache with the store's current contents.
    pub fn refresh(&mut self) {
        let _span = info_span!("refresh").entered();
        match self.store.get_all() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.clamp_selection();
            }
            Err(e) => self.report("refresh", &e),
        }
    }

    fn report(&mut self, op: &'static str, err: &StoreError) {
        warn!(error_kind = err.error_kind(), error = %err, "store operation failed");
        self.status = Some(StatusMessage::error(format!("{op} failed: {err}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use todos_core::{TaskId, TaskStatus};
    use todos_store::MemoryTaskStore;
    use todos_telemetry::{FailureFilter, FailureLayer, FailureLog};
    use tracing_subscriber::layer::SubscriberExt;

    const LEFT_CLICK: MouseEventKind = MouseEventKind::Down(MouseButton::Left);

    /// Wraps a memory store; counts calls and fails them on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryTaskStore,
        failing: Cell<bool>,
        adds: Cell<usize>,
        reads: Cell<usize>,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.failing.get() {
                Err(StoreError::Query("database is locked".into()))
            } else {
                Ok(())
            }
        }
    }

    impl TaskStore for FlakyStore {
        fn add(&self, description: &str, priority: TaskPriority) -> Result<Task, StoreError> {
            self.adds.set(self.adds.get() + 1);
            self.check()?;
            self.inner.add(description, priority)
        }

        fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
            self.check()?;
            self.inner.get(id)
        }

        fn get_all(&self) -> Result<Vec<Task>, StoreError> {
            self.reads.set(self.reads.get() + 1);
            self.check()?;
            self.inner.get_all()
        }

        fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Option<Task>, StoreError> {
            self.check()?;
            self.inner.set_status(id, status)
        }

        fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
            self.check()?;
            self.inner.toggle(id)
        }

        fn remove(&self, id: TaskId) -> Result<bool, StoreError> {
            self.check()?;
            self.inner.remove(id)
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: TaskStore>(presenter: &mut Presenter<S>, text: &str) {
        for c in text.chars() {
            let _ = presenter.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn presenter() -> Presenter<FlakyStore> {
        Presenter::new(FlakyStore::default(), PriorityFilter::All).unwrap()
    }

    fn focus(presenter: &mut Presenter<FlakyStore>, target: Focus) {
        while presenter.focus() != target {
            let _ = presenter.handle_key(press(KeyCode::Tab));
        }
    }

    fn add(presenter: &mut Presenter<FlakyStore>, text: &str, priority: TaskPriority) {
        focus(presenter, Focus::Priority);
        let key = match priority {
            TaskPriority::High => 'h',
            TaskPriority::Medium => 'm',
            TaskPriority::Low => 'l',
        };
        let _ = presenter.handle_key(press(KeyCode::Char(key)));
        focus(presenter, Focus::Input);
        type_text(presenter, text);
        let _ = presenter.handle_key(press(KeyCode::Enter));
    }

    #[test]
    fn starts_in_input_with_high_priority() {
        let p = presenter();
        assert_eq!(p.focus(), Focus::Input);
        assert_eq!(p.priority(), TaskPriority::High);
        assert!(p.tasks().is_empty());
        assert!(p.show_usage());
    }

    #[test]
    fn initial_load_failure_is_returned() {
        let store = FlakyStore::default();
        store.failing.set(true);
        assert_matches!(
            Presenter::new(store, PriorityFilter::All).err(),
            Some(StoreError::Query(_))
        );
    }

    #[test]
    fn tab_cycles_focus_both_ways() {
        let mut p = presenter();
        let mut seen = vec![p.focus()];
        for _ in 0..4 {
            let _ = p.handle_key(press(KeyCode::Tab));
            seen.push(p.focus());
        }
        assert_eq!(seen, Focus::ORDER.to_vec());
        let _ = p.handle_key(press(KeyCode::Tab));
        assert_eq!(p.focus(), Focus::Input);
        let _ = p.handle_key(press(KeyCode::BackTab));
        assert_eq!(p.focus(), Focus::Table);
    }

    #[test]
    fn typing_and_enter_adds_task() {
        let mut p = presenter();
        type_text(&mut p, "Buy milk");
        assert_eq!(p.draft(), "Buy milk");
        let _ = p.handle_key(press(KeyCode::Enter));

        assert_eq!(p.draft(), "");
        assert_eq!(p.tasks().len(), 1);
        assert_eq!(p.tasks()[0].description, "Buy milk");
        assert_eq!(p.tasks()[0].priority, TaskPriority::High);
        assert!(!p.status().unwrap().is_error);
    }

    #[test]
    fn backspace_edits_draft() {
        let mut p = presenter();
        type_text(&mut p, "abc");
        let _ = p.handle_key(press(KeyCode::Backspace));
        assert_eq!(p.draft(), "ab");
    }

    #[test]
    fn blank_draft_makes_no_store_call() {
        let mut p = presenter();
        type_text(&mut p, "   ");
        let _ = p.handle_key(press(KeyCode::Enter));
        focus(&mut p, Focus::Add);
        let _ = p.handle_key(press(KeyCode::Enter));
        assert_eq!(p.store().adds.get(), 0);
        assert!(p.tasks().is_empty());
    }

    #[test]
    fn q_is_text_in_input_and_quit_elsewhere() {
        let mut p = presenter();
        assert_eq!(p.handle_key(press(KeyCode::Char('q'))), Action::Continue);
        assert_eq!(p.draft(), "q");
        focus(&mut p, Focus::Table);
        assert_eq!(p.handle_key(press(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut p = presenter();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(p.handle_key(ctrl_c), Action::Quit);
        assert_eq!(p.draft(), "");
    }

    #[test]
    fn key_release_is_ignored() {
        let mut p = presenter();
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
        let _ = p.handle_key(release);
        assert_eq!(p.draft(), "");
    }

    #[test]
    fn priority_selector_keys() {
        let mut p = presenter();
        focus(&mut p, Focus::Priority);
        let _ = p.handle_key(press(KeyCode::Right));
        assert_eq!(p.priority(), TaskPriority::Medium);
        let _ = p.handle_key(press(KeyCode::Right));
        let _ = p.handle_key(press(KeyCode::Right));
        assert_eq!(p.priority(), TaskPriority::High);
        let _ = p.handle_key(press(KeyCode::Left));
        assert_eq!(p.priority(), TaskPriority::Low);
        let _ = p.handle_key(press(KeyCode::Char('m')));
        assert_eq!(p.priority(), TaskPriority::Medium);
    }

    #[test]
    fn add_button_submits_with_selected_priority() {
        let mut p = presenter();
        type_text(&mut p, "Write report");
        focus(&mut p, Focus::Priority);
        let _ = p.handle_key(press(KeyCode::Char('l')));
        focus(&mut p, Focus::Add);
        let _ = p.handle_key(press(KeyCode::Enter));
        assert_eq!(p.tasks()[0].priority, TaskPriority::Low);
    }

    #[test]
    fn enter_on_table_toggles_selected_row() {
        let mut p = presenter();
        add(&mut p, "Buy milk", TaskPriority::High);
        add(&mut p, "Write report", TaskPriority::Low);
        focus(&mut p, Focus::Table);

        let _ = p.handle_key(press(KeyCode::Down));
        assert_eq!(p.selected_task().unwrap().description, "Buy milk");
        let _ = p.handle_key(press(KeyCode::Enter));
        assert_eq!(p.tasks()[1].status, TaskStatus::Done);
        assert_eq!(p.tasks()[0].status, TaskStatus::Pending);

        let _ = p.handle_key(press(KeyCode::Char(' ')));
        assert_eq!(p.tasks()[1].status, TaskStatus::Pending);
    }

    #[test]
    fn delete_removes_selected_and_clamps() {
        let mut p = presenter();
        add(&mut p, "one", TaskPriority::High);
        add(&mut p, "two", TaskPriority::High);
        focus(&mut p, Focus::Table);
        let _ = p.handle_key(press(KeyCode::Char('j')));
        assert_eq!(p.selected(), 1);

        let _ = p.handle_key(press(KeyCode::Char('d')));
        assert_eq!(p.tasks().len(), 1);
        assert_eq!(p.selected(), 0);
        let _ = p.handle_key(press(KeyCode::Delete));
        assert!(p.tasks().is_empty());
        assert_eq!(p.selected(), 0);

        // Nothing selected: no-op
        let _ = p.handle_key(press(KeyCode::Delete));
        assert!(p.tasks().is_empty());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut p = presenter();
        add(&mut p, "only", TaskPriority::High);
        focus(&mut p, Focus::Table);
        let _ = p.handle_key(press(KeyCode::Up));
        assert_eq!(p.selected(), 0);
        let _ = p.handle_key(press(KeyCode::Down));
        let _ = p.handle_key(press(KeyCode::Down));
        assert_eq!(p.selected(), 0);
    }

    #[test]
    fn filter_is_display_only() {
        let mut p = presenter();
        add(&mut p, "urgent", TaskPriority::High);
        add(&mut p, "later", TaskPriority::Low);
        let reads = p.store().reads.get();

        focus(&mut p, Focus::Filter);
        let _ = p.handle_key(press(KeyCode::Down));
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::High));
        assert_eq!(p.visible().len(), 1);
        assert_eq!(p.visible()[0].description, "urgent");

        let _ = p.handle_key(press(KeyCode::Down));
        let _ = p.handle_key(press(KeyCode::Down));
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::Low));
        let _ = p.handle_key(press(KeyCode::Down));
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::Low));

        assert_eq!(p.store().reads.get(), reads);
        assert_eq!(p.tasks().len(), 2);
        assert_eq!(p.store().inner.get_all().unwrap().len(), 2);
    }

    #[test]
    fn toggle_acts_on_visible_row() {
        let mut p = presenter();
        add(&mut p, "high one", TaskPriority::High);
        add(&mut p, "low one", TaskPriority::Low);
        p.set_filter(PriorityFilter::Only(TaskPriority::High));
        p.toggle_selected();

        let high = p.tasks().iter().find(|t| t.description == "high one").unwrap();
        let low = p.tasks().iter().find(|t| t.description == "low one").unwrap();
        assert_eq!(high.status, TaskStatus::Done);
        assert_eq!(low.status, TaskStatus::Pending);
    }

    #[test]
    fn failing_store_keeps_cache_and_reports() {
        let mut p = presenter();
        add(&mut p, "keep me", TaskPriority::High);
        let before = p.tasks().to_vec();

        p.store().failing.set(true);
        focus(&mut p, Focus::Table);
        let _ = p.handle_key(press(KeyCode::Enter));
        assert_eq!(p.tasks(), before.as_slice());
        let status = p.status().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("toggle failed"));

        focus(&mut p, Focus::Input);
        type_text(&mut p, "lost");
        let _ = p.handle_key(press(KeyCode::Enter));
        assert_eq!(p.tasks(), before.as_slice());
        assert_eq!(p.draft(), "lost", "draft kept for retry");

        p.refresh();
        assert_eq!(p.tasks(), before.as_slice());
    }

    #[test]
    fn too_long_description_is_reported() {
        let mut p = presenter();
        type_text(&mut p, &"x".repeat(todos_core::MAX_DESCRIPTION_CHARS + 1));
        let _ = p.handle_key(press(KeyCode::Enter));
        assert!(p.tasks().is_empty());
        assert!(p.status().unwrap().is_error);
    }

    #[test]
    fn toggle_of_vanished_task_refreshes() {
        let mut p = presenter();
        add(&mut p, "ghost", TaskPriority::High);
        let id = p.tasks()[0].id;
        assert!(p.store().inner.remove(id).unwrap());

        p.toggle_selected();
        assert!(p.tasks().is_empty());
        assert!(p.status().unwrap().text.contains("no longer exists"));
    }

    #[test]
    fn initial_filter_and_usage_flag() {
        let p = Presenter::new(FlakyStore::default(), PriorityFilter::Only(TaskPriority::Medium))
            .unwrap()
            .with_usage(false);
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::Medium));
        assert!(!p.show_usage());
    }

    #[test]
    fn store_failures_reach_the_journal_with_task_and_operation() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = Arc::new(FailureLog::open(&dir.path().join("failures.db")).unwrap());
        let subscriber = tracing_subscriber::registry().with(FailureLayer::new(Arc::clone(&journal)));

        let mut p = presenter();
        add(&mut p, "Buy milk", TaskPriority::High);
        let id = p.tasks()[0].id;
        p.store().failing.set(true);
        focus(&mut p, Focus::Table);

        tracing::subscriber::with_default(subscriber, || {
            let _ = p.handle_key(press(KeyCode::Enter));
            let _ = p.handle_key(press(KeyCode::Char('d')));
            p.refresh();
        });

        let rows = journal.recent(&FailureFilter::default()).unwrap();
        let seen: Vec<_> = rows
            .iter()
            .map(|r| (r.operation.as_deref(), r.task_id, r.error_kind.as_deref()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (Some("refresh"), None, Some("query")),
                (Some("remove"), Some(id.get()), Some("query")),
                (Some("toggle"), Some(id.get()), Some("query")),
            ]
        );
        assert_eq!(rows[2].detail.as_deref(), Some("query failed: database is locked"));
    }

    #[test]
    fn click_focuses_and_picks() {
        let mut p = presenter();
        p.handle_mouse(LEFT_CLICK, Target::Priority(Some(TaskPriority::Low)));
        assert_eq!(p.focus(), Focus::Priority);
        assert_eq!(p.priority(), TaskPriority::Low);

        p.handle_mouse(LEFT_CLICK, Target::Filter(Some(PriorityFilter::Only(TaskPriority::Medium))));
        assert_eq!(p.focus(), Focus::Filter);
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::Medium));

        // Clicking between entries only moves focus
        p.handle_mouse(LEFT_CLICK, Target::Priority(None));
        assert_eq!(p.priority(), TaskPriority::Low);

        p.handle_mouse(LEFT_CLICK, Target::Input);
        assert_eq!(p.focus(), Focus::Input);
    }

    #[test]
    fn click_on_add_submits_draft() {
        let mut p = presenter();
        type_text(&mut p, "Call mum");
        p.handle_mouse(LEFT_CLICK, Target::Add);
        assert_eq!(p.focus(), Focus::Add);
        assert_eq!(p.tasks().len(), 1);
        assert_eq!(p.draft(), "");
    }

    #[test]
    fn click_on_row_selects_without_toggling() {
        let mut p = presenter();
        add(&mut p, "one", TaskPriority::High);
        add(&mut p, "two", TaskPriority::High);
        focus(&mut p, Focus::Input);

        p.handle_mouse(LEFT_CLICK, Target::Table(Some(1)));
        assert_eq!(p.focus(), Focus::Table);
        assert_eq!(p.selected_task().unwrap().description, "one");
        assert!(p.tasks().iter().all(|t| t.status == TaskStatus::Pending));

        p.handle_mouse(LEFT_CLICK, Target::Table(Some(9)));
        assert_eq!(p.selected(), 1);
    }

    #[test]
    fn wheel_moves_selection_but_not_focus() {
        let mut p = presenter();
        add(&mut p, "one", TaskPriority::High);
        add(&mut p, "two", TaskPriority::Low);
        focus(&mut p, Focus::Input);

        p.handle_mouse(MouseEventKind::ScrollDown, Target::Table(None));
        assert_eq!(p.selected(), 1);
        p.handle_mouse(MouseEventKind::ScrollDown, Target::Filter(None));
        assert_eq!(p.filter(), PriorityFilter::Only(TaskPriority::High));
        p.handle_mouse(MouseEventKind::ScrollUp, Target::Filter(None));
        assert_eq!(p.filter(), PriorityFilter::All);
        assert_eq!(p.focus(), Focus::Input);

        p.handle_mouse(MouseEventKind::Moved, Target::Add);
        assert_eq!(p.focus(), Focus::Input);
        assert_eq!(p.tasks().len(), 2);
    }

    #[test]
    fn into_store_returns_data() {
        let mut p = presenter();
        add(&mut p, "persisted", TaskPriority::Medium);
        let store = p.into_store();
        assert_eq!(store.inner.get_all().unwrap().len(), 1);
    }
}
