use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::config::Config;
use crate::dataset;
use crate::error::{ReleveError, Result};
use crate::models::{format_date, Transaction, DEFAULT_CATEGORY};
use crate::rules::RuleSet;
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const PAGE_SIZE: usize = 20;

/// What the editor lets the user pick: a subcategory and the main category
/// that follows from it. Edits never touch any other column.
#[derive(Debug, Clone)]
pub struct SubcategoryChoice {
    pub subcategory: String,
    pub main_category: String,
}

pub fn choices_from_rules(rules: &RuleSet) -> Vec<SubcategoryChoice> {
    let mut choices: Vec<SubcategoryChoice> = rules
        .iter()
        .map(|r| SubcategoryChoice {
            subcategory: r.subcategory.clone(),
            main_category: r.main_category.clone(),
        })
        .collect();
    if !choices.iter().any(|c| c.subcategory == DEFAULT_CATEGORY) {
        choices.push(SubcategoryChoice {
            subcategory: DEFAULT_CATEGORY.to_string(),
            main_category: DEFAULT_CATEGORY.to_string(),
        });
    }
    choices
}

enum BrowseMode {
    Normal,
    Search(String),
    EditSubcategory { query: String, selection: usize },
}

pub enum BrowseAction {
    Continue,
    Close,
    CommitEdit,
}

/// Interactive viewer/editor over the accumulated dataset. Filters mirror
/// the three the reporting surface always needed: free text on Details,
/// account, category. Edits are restricted to Category/Subcategory and mark
/// the row as manual; every commit rewrites the whole dataset file.
pub struct DatasetBrowser {
    rows: Vec<Transaction>,
    visible: Vec<usize>,
    search: String,
    account_filter: Option<usize>,
    category_filter: Option<usize>,
    accounts: Vec<String>,
    categories: Vec<String>,
    choices: Vec<SubcategoryChoice>,
    choice_labels: Vec<String>,
    offset: usize,
    visible_count: usize,
    selected: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    pending_choice: Option<usize>,
    table_state: TableState,
}

impl DatasetBrowser {
    pub fn new(rows: Vec<Transaction>, choices: Vec<SubcategoryChoice>) -> Self {
        let mut accounts: Vec<String> = rows.iter().map(|t| t.account.clone()).collect();
        accounts.sort();
        accounts.dedup();
        let mut categories: Vec<String> = rows.iter().map(|t| t.category.clone()).collect();
        categories.sort();
        categories.dedup();

        let choice_labels: Vec<String> = choices
            .iter()
            .map(|c| format!("{} ({})", c.subcategory, c.main_category))
            .collect();

        let mut browser = Self {
            visible: (0..rows.len()).collect(),
            rows,
            search: String::new(),
            account_filter: None,
            category_filter: None,
            accounts,
            categories,
            choices,
            choice_labels,
            offset: 0,
            visible_count: PAGE_SIZE,
            selected: 0,
            mode: BrowseMode::Normal,
            status_message: None,
            pending_choice: None,
            table_state: TableState::default(),
        };
        browser.apply_filters();
        browser
    }

    pub fn run(&mut self, config: &Config) -> Result<()> {
        if self.rows.is_empty() {
            println!("Dataset is empty. Run `releve run` first.");
            return Ok(());
        }

        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal, config);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, config: &Config) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                match self.handle_key_event(code) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                    BrowseAction::CommitEdit => {
                        if let Err(e) = self.commit_edit(config) {
                            self.status_message = Some(format!("Edit failed: {e}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Recompute the visible row set from the current filters.
    fn apply_filters(&mut self) {
        let search = self.search.to_lowercase();
        let account = self.account_filter.map(|i| self.accounts[i].as_str());
        let category = self.category_filter.map(|i| self.categories[i].as_str());
        self.visible = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                (search.is_empty() || t.details.to_lowercase().contains(&search))
                    && account.map_or(true, |a| t.account == a)
                    && category.map_or(true, |c| t.category == c)
            })
            .map(|(i, _)| i)
            .collect();
        self.offset = 0;
        self.selected = 0;
    }

    fn filters_desc(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("search: {}", self.search));
        }
        if let Some(i) = self.account_filter {
            parts.push(format!("account: {}", self.accounts[i]));
        }
        if let Some(i) = self.category_filter {
            parts.push(format!("category: {}", self.categories[i]));
        }
        parts.join(", ")
    }

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let narrow = area.width < 110;

        let edit_height: u16 = match &self.mode {
            BrowseMode::EditSubcategory { .. } => 1 + self.filtered_choices().len().min(9) as u16,
            _ => 0,
        };

        let areas = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(edit_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
        let title_area = areas[0];
        let table_area = areas[1];
        let edit_area = areas[2];
        let status_area = areas[3];
        let keys_area = areas[4];

        frame.render_widget(
            Paragraph::new("Bank Operations").style(HEADER_STYLE),
            title_area,
        );

        let (fixed_cols, num_cols): (u16, u16) = if narrow {
            (2 + 10 + 12 + 16, 5)
        } else {
            (2 + 10 + 12 + 13 + 14 + 16, 7)
        };
        let spacing = num_cols - 1;
        let desc_width = table_area.width.saturating_sub(fixed_cols + spacing) as usize;
        let desc_width = desc_width.max(10);

        let header_overhead = 2u16; // header row + bottom margin
        let available_height = table_area.height.saturating_sub(header_overhead) as usize;
        let mut rendered_rows = Vec::new();
        let mut total_height = 0usize;
        let mut vis = 0usize;

        for &row_idx in self.visible.iter().skip(self.offset) {
            let txn = &self.rows[row_idx];
            let (wrapped_desc, line_count) = tui::wrap_text(&txn.details, desc_width);
            let h = line_count as usize;
            if total_height + h > available_height && vis > 0 {
                break;
            }

            let manual_cell = Cell::from(if txn.is_manual { "*" } else { "" });
            let amt = tui::money_span(txn.amount, txn.debit_credit);
            let cells: Vec<Cell> = if narrow {
                vec![
                    manual_cell,
                    Cell::from(format_date(txn.date)),
                    Cell::from(wrapped_desc),
                    Cell::from(amt),
                    Cell::from(txn.subcategory.clone()),
                ]
            } else {
                vec![
                    manual_cell,
                    Cell::from(format_date(txn.date)),
                    Cell::from(wrapped_desc),
                    Cell::from(amt),
                    Cell::from(txn.account.clone()),
                    Cell::from(txn.category.clone()),
                    Cell::from(txn.subcategory.clone()),
                ]
            };
            rendered_rows.push(Row::new(cells).height(line_count));
            total_height += h;
            vis += 1;
        }
        self.visible_count = vis.max(1);

        let widths: Vec<Constraint> = if narrow {
            vec![
                Constraint::Length(2),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(16),
            ]
        } else {
            vec![
                Constraint::Length(2),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(13),
                Constraint::Length(14),
                Constraint::Length(16),
            ]
        };
        let header_cells: Vec<&str> = if narrow {
            vec!["", "Date", "Details", "Amount", "Subcategory"]
        } else {
            vec![
                "",
                "Date",
                "Details",
                "Amount",
                "Account",
                "Category",
                "Subcategory",
            ]
        };

        self.table_state.select(Some(self.selected));
        let table = Table::new(rendered_rows, widths)
            .header(Row::new(header_cells).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        if edit_height > 0 {
            let edit_lines: Vec<Line> = match &self.mode {
                BrowseMode::EditSubcategory { query, selection } => {
                    let matches = self.filtered_choices();
                    let mut lines = vec![Line::from(format!("  Subcategory: {query}\u{2588}"))];
                    if !query.is_empty() && matches.is_empty() {
                        lines.push(Line::from(Span::styled(
                            "    (no matches)",
                            Style::default().fg(Color::DarkGray),
                        )));
                    } else {
                        for (i, (_, label)) in matches.iter().enumerate() {
                            let marker = if i == *selection { ">" } else { " " };
                            lines.push(Line::from(format!("  {marker} {label}")));
                        }
                    }
                    lines
                }
                _ => vec![],
            };
            frame.render_widget(Paragraph::new(edit_lines), edit_area);
        }

        let end_row = (self.offset + self.visible_count).min(self.visible.len());
        let filters = if self.filters_desc().is_empty() {
            String::new()
        } else {
            format!(" | {}", self.filters_desc())
        };
        let status = if let Some(ref msg) = self.status_message {
            format!(
                "Rows {}-{} of {}{} | {}",
                self.offset.min(self.visible.len()) + usize::from(!self.visible.is_empty()),
                end_row,
                self.visible.len(),
                filters,
                msg,
            )
        } else {
            format!(
                "Rows {}-{} of {}{}",
                self.offset.min(self.visible.len()) + usize::from(!self.visible.is_empty()),
                end_row,
                self.visible.len(),
                filters,
            )
        };
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys_widget = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  e:edit  /:search  a:account  c:category  x:clear  n/\u{2192}:next  p/\u{2190}:prev  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search(input) => Paragraph::new(format!("Search details: {input}\u{2588}")),
            BrowseMode::EditSubcategory { .. } => {
                Paragraph::new("Type to filter, Enter=apply, Esc=cancel").style(FOOTER_STYLE)
            }
        };
        frame.render_widget(keys_widget, keys_area);
    }

    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                KeyCode::Down => {
                    if self.selected + 1
                        < self
                            .visible_count
                            .min(self.visible.len().saturating_sub(self.offset))
                    {
                        self.selected += 1;
                    } else if self.offset + self.visible_count < self.visible.len() {
                        self.offset += 1;
                    }
                }
                KeyCode::Up => {
                    if self.selected > 0 {
                        self.selected -= 1;
                    } else if self.offset > 0 {
                        self.offset -= 1;
                    }
                }
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    if self.offset + self.visible_count < self.visible.len() {
                        self.offset += self.visible_count;
                    }
                    self.selected = 0;
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    self.offset = self.offset.saturating_sub(self.visible_count);
                    self.selected = 0;
                }
                KeyCode::Home => {
                    self.offset = 0;
                    self.selected = 0;
                }
                KeyCode::End => {
                    self.offset = self.visible.len().saturating_sub(PAGE_SIZE);
                    self.selected = 0;
                }
                KeyCode::Char('/') => {
                    self.mode = BrowseMode::Search(self.search.clone());
                }
                KeyCode::Char('a') => {
                    self.account_filter = cycle(self.account_filter, self.accounts.len());
                    self.apply_filters();
                }
                KeyCode::Char('c') => {
                    self.category_filter = cycle(self.category_filter, self.categories.len());
                    self.apply_filters();
                }
                KeyCode::Char('x') => {
                    self.search.clear();
                    self.account_filter = None;
                    self.category_filter = None;
                    self.apply_filters();
                }
                KeyCode::Char('e') | KeyCode::Enter => {
                    if !self.choices.is_empty() && !self.visible.is_empty() {
                        self.mode = BrowseMode::EditSubcategory {
                            query: String::new(),
                            selection: 0,
                        };
                    }
                }
                _ => {}
            },
            BrowseMode::Search(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => {
                    if let BrowseMode::Search(input) =
                        std::mem::replace(&mut self.mode, BrowseMode::Normal)
                    {
                        self.search = input;
                        self.apply_filters();
                    }
                }
                KeyCode::Backspace => {
                    if let BrowseMode::Search(input) = &mut self.mode {
                        input.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let BrowseMode::Search(input) = &mut self.mode {
                        input.push(c);
                    }
                }
                _ => {}
            },
            BrowseMode::EditSubcategory { .. } => {
                return self.handle_edit_key(code);
            }
        }
        BrowseAction::Continue
    }

    fn filtered_choices(&self) -> Vec<(usize, &str)> {
        let query = match &self.mode {
            BrowseMode::EditSubcategory { query, .. } => query.to_lowercase(),
            _ => return vec![],
        };
        self.choice_labels
            .iter()
            .enumerate()
            .filter(|(_, label)| query.is_empty() || label.to_lowercase().contains(&query))
            .map(|(i, s)| (i, s.as_str()))
            .take(9)
            .collect()
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> BrowseAction {
        match code {
            KeyCode::Char(c) => {
                if let BrowseMode::EditSubcategory { query, selection } = &mut self.mode {
                    query.push(c);
                    *selection = 0;
                }
            }
            KeyCode::Backspace => {
                if let BrowseMode::EditSubcategory { query, selection } = &mut self.mode {
                    query.pop();
                    *selection = 0;
                }
            }
            KeyCode::Up => {
                if let BrowseMode::EditSubcategory { selection, .. } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                let count = self.filtered_choices().len();
                if let BrowseMode::EditSubcategory { selection, .. } = &mut self.mode {
                    if count > 0 && *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let matches = self.filtered_choices();
                if !matches.is_empty() {
                    let sel_idx = match &self.mode {
                        BrowseMode::EditSubcategory { selection, .. } => {
                            (*selection).min(matches.len() - 1)
                        }
                        _ => 0,
                    };
                    self.pending_choice = Some(matches[sel_idx].0);
                    self.mode = BrowseMode::Normal;
                    return BrowseAction::CommitEdit;
                }
            }
            KeyCode::Esc => {
                self.mode = BrowseMode::Normal;
                self.pending_choice = None;
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    /// Apply the pending choice to the selected row and rewrite the dataset
    /// file. Only Category/Subcategory change; the row is marked manual.
    pub fn commit_edit(&mut self, config: &Config) -> Result<()> {
        let Some(choice_idx) = self.pending_choice.take() else {
            return Ok(());
        };
        let abs_idx = self.offset + self.selected;
        let row_idx = *self
            .visible
            .get(abs_idx)
            .ok_or_else(|| ReleveError::Other("No row selected".into()))?;

        let choice = &self.choices[choice_idx];
        let row = &mut self.rows[row_idx];
        row.subcategory = choice.subcategory.clone();
        row.category = choice.main_category.clone();
        row.is_manual = true;

        dataset::write(&config.output_final, &self.rows, config)?;
        self.status_message = Some(format!("Saved: {}", choice.subcategory));
        Ok(())
    }

    #[cfg(test)]
    fn visible_details(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|&i| self.rows[i].details.as_str())
            .collect()
    }
}

fn cycle(current: Option<usize>, len: usize) -> Option<usize> {
    match current {
        None if len > 0 => Some(0),
        Some(i) if i + 1 < len => Some(i + 1),
        _ => None,
    }
}
