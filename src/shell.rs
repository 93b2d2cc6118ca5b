//! Interactive session keeping the table, board and detail panel open at once.
//!
//! Each line typed is parsed into a [`ShellCommand`] and run against the
//! [`Session`], which owns every open view and routes cross-view refreshes:
//! when one view changes a job, the others that show it re-fetch that one
//! record. Search progress arrives from a [`SearchPoller`] between commands.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::Backend;
use crate::error::TrackerError;
use crate::lifecycle::{Lifecycle, Status};
use crate::poller::{PollEnd, PollEvent, SearchPoller};
use crate::ui;
use crate::views::{DashboardView, DetailPanel, KanbanView, Notice, OpenViews, TableState, TableView};

const HELP: &[(&str, &str)] = &[
    ("jobs", "open the jobs table"),
    ("next / prev", "page through the table"),
    ("board [status]", "open the pipeline board, optionally one column"),
    ("dash", "show the dashboard"),
    ("open <id>", "open a job in the detail panel"),
    ("act <id> <label>", "run a suggested action from the table"),
    ("move <id> <status>", "move a card on the board"),
    ("set <status>", "change the open job's status"),
    ("note <text>", "edit the open job's notes"),
    ("blur", "leave the notes field, saving changes"),
    ("close", "close the detail panel"),
    ("search [role]", "start a job search"),
    ("dismiss", "stop following the running search"),
    ("help", "show this list"),
    ("quit", "leave the shell"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Jobs,
    Next,
    Prev,
    Board(Option<Status>),
    Dash,
    Open(i64),
    Act { id: i64, label: String },
    Move { id: i64, status: String },
    Set(String),
    Note(String),
    Blur,
    Close,
    Search(Option<String>),
    Dismiss,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "jobs" => ShellCommand::Jobs,
        "next" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "board" if rest.is_empty() => ShellCommand::Board(None),
        "board" => ShellCommand::Board(Some(rest.parse::<Status>().map_err(|err| err.to_string())?)),
        "dash" | "dashboard" => ShellCommand::Dash,
        "open" => ShellCommand::Open(job_id(rest)?),
        "act" => {
            let (id, label) = id_and_text(rest, "act <id> <label>")?;
            ShellCommand::Act { id, label }
        }
        "move" => {
            let (id, status) = id_and_text(rest, "move <id> <status>")?;
            ShellCommand::Move { id, status }
        }
        "set" if !rest.is_empty() => ShellCommand::Set(rest.to_string()),
        "set" => return Err("usage: set <status>".into()),
        // Empty text is allowed: it clears the notes.
        "note" => ShellCommand::Note(rest.to_string()),
        "blur" => ShellCommand::Blur,
        "close" => ShellCommand::Close,
        "search" => ShellCommand::Search(Some(rest.to_string()).filter(|r| !r.is_empty())),
        "dismiss" => ShellCommand::Dismiss,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}', try `help`")),
    };
    Ok(Some(command))
}

fn job_id(raw: &str) -> Result<i64, String> {
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("expected a job id, got '{raw}'"))
}

fn id_and_text(rest: &str, usage: &str) -> Result<(i64, String), String> {
    match rest.split_once(char::is_whitespace) {
        Some((id, text)) if !text.trim().is_empty() => Ok((job_id(id)?, text.trim().to_string())),
        _ => Err(format!("usage: {usage}")),
    }
}

struct ActiveSearch {
    poller: SearchPoller,
    events: mpsc::UnboundedReceiver<PollEvent>,
}

/// State of one interactive session.
pub struct Session<B> {
    engine: Lifecycle<B>,
    table_state: TableState,
    poll_interval: Duration,
    table: Option<TableView>,
    board: Option<KanbanView>,
    panel: Option<DetailPanel>,
    search: Option<ActiveSearch>,
}

impl<B> Session<B>
where
    B: Backend + Clone + Send + Sync + 'static,
{
    pub fn new(backend: B, table_state: TableState, poll_interval: Duration) -> Self {
        Self {
            engine: Lifecycle::new(backend),
            table_state,
            poll_interval,
            table: None,
            board: None,
            panel: None,
            search: None,
        }
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    pub fn board(&self) -> Option<&KanbanView> {
        self.board.as_ref()
    }

    pub fn panel(&self) -> Option<&DetailPanel> {
        self.panel.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Vec<String> {
        debug!(?command, "shell command");
        match command {
            ShellCommand::Jobs => {
                let mut table = TableView::new(self.table_state.clone());
                // A failed load renders in place of the rows.
                let _ = table.load(self.engine.backend()).await;
                let lines = table.render();
                self.table = Some(table);
                lines
            }
            ShellCommand::Next => self.turn_page(TableView::next_page),
            ShellCommand::Prev => self.turn_page(TableView::prev_page),
            ShellCommand::Board(status) => {
                let mut board = KanbanView::filtered(status);
                let _ = board.load(self.engine.backend()).await;
                let lines = board.render();
                self.board = Some(board);
                lines
            }
            ShellCommand::Dash => {
                let mut dashboard = DashboardView::default();
                let _ = dashboard.load(self.engine.backend()).await;
                dashboard.render()
            }
            ShellCommand::Open(id) => self.open(id).await,
            ShellCommand::Act { id, label } => self.act(id, &label).await,
            ShellCommand::Move { id, status } => self.move_card(id, &status).await,
            ShellCommand::Set(status) => self.set_status(&status).await,
            ShellCommand::Note(text) => {
                let Some(panel) = self.panel.as_mut() else {
                    return no_view("a job", "open <id>");
                };
                panel.edit_notes(text);
                vec![ui::muted("Notes edited, `blur` to save")]
            }
            ShellCommand::Blur => {
                let mut lines = self.blur_notes().await;
                if lines.is_empty() {
                    lines.push(ui::muted("Notes unchanged"));
                }
                lines
            }
            ShellCommand::Close => {
                let mut lines = self.blur_notes().await;
                if self.panel.take().is_some() {
                    lines.push(ui::muted("Panel closed"));
                }
                lines
            }
            ShellCommand::Search(role) => self.start_search(role.as_deref()).await,
            ShellCommand::Dismiss => match self.search.take() {
                Some(active) => {
                    active.poller.stop().await;
                    notice(Notice::info("Stopped following the search"))
                }
                None => notice(Notice::info("No search is running")),
            },
            ShellCommand::Help => HELP
                .iter()
                .map(|(usage, what)| format!("  {usage:<20} {}", ui::muted(what)))
                .collect(),
            ShellCommand::Quit => Vec::new(),
        }
    }

    fn turn_page(&mut self, turn: fn(&mut TableView) -> bool) -> Vec<String> {
        let Some(table) = self.table.as_mut() else {
            return no_view("the jobs table", "jobs");
        };
        if !turn(table) {
            return notice(Notice::info("No more pages"));
        }
        table.render()
    }

    async fn open(&mut self, id: i64) -> Vec<String> {
        // Switching jobs takes focus away from the notes field.
        let mut lines = self.blur_notes().await;
        match DetailPanel::open(self.engine.backend(), id).await {
            Ok(panel) => {
                lines.extend(panel.render());
                self.panel = Some(panel);
            }
            Err(err) => lines.push(ui::notice_line(&Notice::error(format!(
                "Could not open job #{id}: {err}"
            )))),
        }
        lines
    }

    async fn act(&mut self, id: i64, label: &str) -> Vec<String> {
        let Some(table) = self.table.as_mut() else {
            return no_view("the jobs table", "jobs");
        };
        let before = table.cache().get(id).cloned();
        let result = table.quick_action(&self.engine, id, label).await;
        let changed = table.cache().get(id) != before.as_ref();

        let mut lines = vec![ui::notice_line(&result)];
        if changed {
            let backend = self.engine.backend();
            if let Some(board) = self.board.as_mut() {
                board.refresh_card_by_id(backend, id).await;
            }
            refresh_panel(&mut self.panel, backend, id).await;
        }
        lines.extend(table.render());
        lines
    }

    async fn move_card(&mut self, id: i64, status: &str) -> Vec<String> {
        let Some(board) = self.board.as_mut() else {
            return no_view("the board", "board");
        };
        let before = board.find(id).cloned();
        let result = board.move_card(&self.engine, id, status).await;
        let changed = board.find(id) != before.as_ref();

        let mut lines = vec![ui::notice_line(&result)];
        if let Some(targets) = board.move_targets(id).filter(|_| result.is_error()) {
            let keys: Vec<&str> = targets.iter().map(|s| s.key()).collect();
            lines.push(ui::muted(&format!("Move to: {}", keys.join(", "))));
        }
        if changed {
            let backend = self.engine.backend();
            if let Some(table) = self.table.as_mut() {
                table.refresh_row_by_id(backend, id).await;
            }
            refresh_panel(&mut self.panel, backend, id).await;
        }
        lines.extend(board.render());
        lines
    }

    async fn set_status(&mut self, status: &str) -> Vec<String> {
        let Some(panel) = self.panel.as_mut() else {
            return no_view("a job", "open <id>");
        };
        let views = OpenViews {
            table: self.table.as_mut(),
            board: self.board.as_mut(),
        };
        let result = panel.change_status(&self.engine, status, views).await;
        let mut lines = vec![ui::notice_line(&result)];
        lines.extend(panel.render());
        lines
    }

    async fn blur_notes(&mut self) -> Vec<String> {
        let Some(panel) = self.panel.as_mut() else {
            return Vec::new();
        };
        panel
            .blur_notes(&self.engine)
            .await
            .map(|n| ui::notice_line(&n))
            .into_iter()
            .collect()
    }

    async fn start_search(&mut self, role: Option<&str>) -> Vec<String> {
        if self.search.is_some() {
            return notice(Notice::error("A search is already running, `dismiss` it first"));
        }
        match self.engine.backend().start_search(role).await {
            Ok(ack) if ack.ok => {
                let (poller, events) =
                    SearchPoller::spawn(self.engine.backend().clone(), self.poll_interval);
                self.search = Some(ActiveSearch { poller, events });
                let message = ack.message.unwrap_or_else(|| "Search started".into());
                notice(Notice::info(message))
            }
            Ok(ack) => notice(Notice::error(
                ack.message.unwrap_or_else(|| "Search was not started".into()),
            )),
            Err(err) => notice(Notice::from(&err)),
        }
    }

    /// Wait for the next event of the running search. Never resolves while
    /// no search is being followed.
    pub async fn next_search_event(&mut self) -> Option<PollEvent> {
        match self.search.as_mut() {
            Some(active) => active.events.recv().await,
            None => std::future::pending().await,
        }
    }

    pub async fn on_search_event(&mut self, event: Option<PollEvent>) -> Vec<String> {
        match event {
            Some(PollEvent::Progress(status)) if status.running => {
                vec![ui::muted(&format!("search: {}", status.progress))]
            }
            Some(PollEvent::Failed(message)) => notice(Notice::error(format!(
                "Search status unavailable: {message}"
            ))),
            Some(PollEvent::Progress(_)) | None => self.finish_search().await,
        }
    }

    async fn finish_search(&mut self) -> Vec<String> {
        let Some(active) = self.search.take() else {
            return Vec::new();
        };
        let status = match active.poller.join().await {
            PollEnd::Finished(status) => status,
            PollEnd::Stopped => return Vec::new(),
        };
        if status.progress.starts_with("Error") {
            return notice(Notice::error(status.progress));
        }

        let mut lines = notice(Notice::info(format!(
            "Search finished: found {}, {} new",
            status.found, status.added
        )));
        if let Some(table) = self.table.as_mut() {
            let _ = table.load(self.engine.backend()).await;
            lines.extend(table.render());
        }
        lines
    }

    /// Leaving the shell takes focus from the notes field and stops
    /// following the search.
    pub async fn shutdown(&mut self) -> Vec<String> {
        let lines = self.blur_notes().await;
        if let Some(active) = self.search.take() {
            active.poller.stop().await;
        }
        lines
    }
}

async fn refresh_panel<B: Backend>(panel: &mut Option<DetailPanel>, backend: &B, id: i64) {
    if let Some(panel) = panel.as_mut().filter(|p| p.job().id == id) {
        panel.refresh(backend).await;
    }
}

fn notice(notice: Notice) -> Vec<String> {
    vec![ui::notice_line(&notice)]
}

fn no_view(what: &str, command: &str) -> Vec<String> {
    notice(Notice::error(format!("Open {what} first with `{command}`")))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run<B>(mut session: Session<B>) -> Result<(), TrackerError>
where
    B: Backend + Clone + Send + Sync + 'static,
{
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", ui::heading("jobtrail shell"));
    println!("{}", ui::muted("Type `help` for commands."));

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match parse(&line) {
                    Ok(None) => {}
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => print_lines(&session.execute(command).await),
                    Err(message) => ui::print_notice(&Notice::error(message)),
                }
            }
            event = session.next_search_event() => {
                println!();
                print_lines(&session.on_search_event(event).await);
            }
        }
    }

    print_lines(&session.shutdown().await);
    Ok(())
}
