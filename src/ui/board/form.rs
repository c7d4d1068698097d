use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::FieldError;
use crate::task::{Priority, TaskDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFieldId {
    Title,
    Description,
    DueDate,
    Priority,
}

impl FormFieldId {
    // Names match the validation field names.
    fn key(self) -> &'static str {
        match self {
            FormFieldId::Title => "title",
            FormFieldId::Description => "description",
            FormFieldId::DueDate => "dueDate",
            FormFieldId::Priority => "priority",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: FormFieldId,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

/// The new-task form: four fields, one active at a time.
#[derive(Debug, Clone)]
pub struct TaskForm {
    fields: Vec<FormField>,
    active: usize,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            fields: vec![
                FormField {
                    id: FormFieldId::Title,
                    label: "Title",
                    value: String::new(),
                    required: true,
                    error: None,
                },
                FormField {
                    id: FormFieldId::Description,
                    label: "Description",
                    value: String::new(),
                    required: false,
                    error: None,
                },
                FormField {
                    id: FormFieldId::DueDate,
                    label: "Due (YYYY-MM-DD)",
                    value: String::new(),
                    required: true,
                    error: None,
                },
                FormField {
                    id: FormFieldId::Priority,
                    label: "Priority",
                    value: String::new(),
                    required: true,
                    error: None,
                },
            ],
            active: 0,
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_field(&self) -> FormFieldId {
        self.fields[self.active].id
    }

    /// True once a rejected submit has marked any field.
    pub fn was_validated(&self) -> bool {
        self.fields.iter().any(|field| field.error.is_some())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => FormAction::Cancel,
            KeyCode::Enter => FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.active = (self.active + 1) % self.fields.len();
                FormAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.active = (self.active + self.fields.len() - 1) % self.fields.len();
                FormAction::None
            }
            KeyCode::Left if self.active_field() == FormFieldId::Priority => {
                self.cycle_priority(-1);
                FormAction::None
            }
            KeyCode::Right if self.active_field() == FormFieldId::Priority => {
                self.cycle_priority(1);
                FormAction::None
            }
            KeyCode::Backspace => {
                let field = &mut self.fields[self.active];
                field.value.pop();
                field.error = None;
                FormAction::None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let field = &mut self.fields[self.active];
                field.value.clear();
                field.error = None;
                FormAction::None
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let field = &mut self.fields[self.active];
                field.value.push(ch);
                field.error = None;
                FormAction::None
            }
            _ => FormAction::None,
        }
    }

    fn cycle_priority(&mut self, delta: isize) {
        let field = &mut self.fields[self.active];
        let current = field
            .value
            .parse::<Priority>()
            .ok()
            .and_then(|priority| Priority::ALL.iter().position(|p| *p == priority));
        let len = Priority::ALL.len() as isize;
        let next = match current {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None if delta > 0 => 0,
            None => Priority::ALL.len() - 1,
        };
        field.value = Priority::ALL[next].to_string();
        field.error = None;
    }

    pub fn draft(&self) -> TaskDraft {
        let value = |id: FormFieldId| {
            self.fields
                .iter()
                .find(|field| field.id == id)
                .map(|field| field.value.clone())
                .unwrap_or_default()
        };
        TaskDraft {
            title: value(FormFieldId::Title),
            description: value(FormFieldId::Description),
            due_date: value(FormFieldId::DueDate),
            priority: value(FormFieldId::Priority),
        }
    }

    /// Mark rejected fields and move focus to the first of them.
    pub fn apply_errors(&mut self, errors: &[FieldError]) {
        for field in &mut self.fields {
            field.error = errors
                .iter()
                .find(|error| error.field == field.id.key())
                .map(|error| error.message.clone());
        }
        if let Some(first) = self.fields.iter().position(|field| field.error.is_some()) {
            self.active = first;
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
