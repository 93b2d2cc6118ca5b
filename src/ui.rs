//! Interface de terminal do jobtrail: estilos, avisos e spinner de busca.
//!
//! Usa `console` para colorir status, botões de ação e avisos, e
//! `indicatif` para o spinner que acompanha uma busca em andamento.
//! As views montam linhas de texto com estes helpers; nada aqui faz I/O
//! de rede.

use std::time::Duration;

use chrono::NaiveDateTime;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::SearchStatus;
use crate::lifecycle::{Intent, Status, StatusValue, SuggestedAction};
use crate::views::{Notice, NoticeLevel};

fn status_style(value: &StatusValue) -> Style {
    match value.known() {
        Some(Status::Saved) => Style::new().blue(),
        Some(Status::Applied | Status::FollowedUp) => Style::new().yellow(),
        Some(Status::Interview) => Style::new().cyan().bold(),
        Some(Status::Offer) => Style::new().green().bold(),
        Some(Status::Rejected | Status::Declined) => Style::new().red(),
        Some(Status::Withdrawn) | None => Style::new().dim(),
    }
}

/// Rótulo colorido de um status; valores desconhecidos aparecem como vieram.
pub fn status_badge(value: &StatusValue) -> String {
    status_style(value).apply_to(value.label()).to_string()
}

/// Botão de ação rápida, colorido pela intenção.
pub fn action_button(action: &SuggestedAction) -> String {
    let style = match action.intent {
        Intent::Primary => Style::new().green(),
        Intent::Danger => Style::new().red(),
        Intent::Neutral => Style::new().dim(),
    };
    style.apply_to(format!("[{}]", action.label)).to_string()
}

pub fn heading(text: &str) -> String {
    Style::new().bold().underlined().apply_to(text).to_string()
}

pub fn muted(text: &str) -> String {
    Style::new().dim().apply_to(text).to_string()
}

/// Linha de aviso transitório: verde para info, vermelho para erro.
pub fn notice_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("{} {}", Style::new().green().apply_to("✓"), notice.message),
        NoticeLevel::Error => format!(
            "{} {}",
            Style::new().red().bold().apply_to("✗"),
            notice.message
        ),
    }
}

/// Avisos de erro vão para stderr, o resto para stdout.
pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}", notice_line(notice)),
        NoticeLevel::Error => eprintln!("{}", notice_line(notice)),
    }
}

/// Data curta (`YYYY-MM-DD`) a partir dos timestamps do backend.
pub fn short_date(raw: &str) -> String {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.chars().take(10).collect())
}

/// Corta `text` em `width` caracteres, terminando com reticências.
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return format!("{text:<width$}");
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Indicador visual de uma busca de vagas em andamento.
pub struct SearchProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl SearchProgress {
    /// Inicia o spinner com o papel buscado (ou todos os papéis-alvo).
    pub fn start(role: Option<&str>) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Starting search for {}...",
            role.unwrap_or("all target roles")
        ));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    pub fn update(&self, status: &SearchStatus) {
        self.pb.set_message(status.progress.clone());
    }

    pub fn warn(&self, message: &str) {
        self.pb
            .println(format!("  {} {message}", Style::new().yellow().apply_to("↻")));
    }

    /// Finaliza o spinner com o resultado da busca.
    pub fn finish(&self, status: &SearchStatus) {
        self.pb.finish_and_clear();
        if status.progress.starts_with("Error") {
            println!("  {} {}", self.red.apply_to("✗"), status.progress);
        } else {
            println!(
                "  {} Found {}, {} new",
                self.green.apply_to("✓"),
                status.found,
                status.added
            );
        }
    }

    /// O usuário dispensou o acompanhamento; a busca continua no backend.
    pub fn dismiss(&self) {
        self.pb.finish_and_clear();
    }
}
