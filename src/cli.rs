//! Interface de linha de comando do jobtrail baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (dashboard, jobs,
//! board, show, status, act, notes, statuses, search, export, shell) e flags globais
//! (--api-url, --config, --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::{JobQuery, SortKey};
use crate::lifecycle::Status;

/// jobtrail: acompanha candidaturas a vagas pelo backend do job tracker.
#[derive(Debug, Parser)]
#[command(name = "jobtrail", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL base do backend (sobrepõe jobtrail.toml e JOBTRAIL_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Caminho alternativo para o arquivo de configuração.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Ordenação aceita pela CLI, mapeada para [`SortKey`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Maior pontuação primeiro.
    Score,
    /// Publicação mais recente primeiro.
    Date,
    /// Ordem alfabética de empresa.
    Company,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Score => SortKey::Score,
            SortArg::Date => SortKey::Date,
            SortArg::Company => SortKey::Company,
        }
    }
}

/// Filtros da tabela de vagas.
#[derive(Debug, Clone, Default, Args)]
pub struct JobFilters {
    /// Busca livre em título e empresa.
    #[arg(long, short)]
    pub query: Option<String>,

    /// Apenas vagas neste status.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,

    /// Apenas vagas desta fonte.
    #[arg(long)]
    pub source: Option<String>,

    /// Pontuação mínima.
    #[arg(long)]
    pub min_score: Option<i64>,

    /// Apenas vagas remotas.
    #[arg(long, default_value_t = false)]
    pub remote: bool,

    /// Ordenação dos resultados.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Número máximo de vagas pedidas ao backend.
    #[arg(long)]
    pub limit: Option<u32>,
}

impl JobFilters {
    pub fn to_query(&self) -> JobQuery {
        JobQuery {
            q: self.query.clone().filter(|q| !q.is_empty()),
            status: self.status,
            source: self.source.clone(),
            min_score: self.min_score,
            is_remote: self.remote,
            sort: self.sort.map(SortKey::from),
            limit: self.limit,
        }
    }
}

fn parse_status(raw: &str) -> Result<Status, String> {
    raw.parse::<Status>().map_err(|err| err.to_string())
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mostra o funil de candidaturas e as atualizações recentes.
    Dashboard,

    /// Lista vagas em uma tabela paginada com ações sugeridas.
    Jobs {
        #[command(flatten)]
        filters: JobFilters,

        /// Página a mostrar (começando em 1).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Mostra o quadro kanban das candidaturas.
    Board {
        /// Mostra apenas a coluna deste status.
        #[arg(long, short, value_parser = parse_status)]
        status: Option<Status>,
    },

    /// Mostra todos os detalhes de uma vaga.
    Show {
        /// Id da vaga.
        id: i64,
    },

    /// Move uma vaga para outro status.
    Status {
        id: i64,

        /// Status de destino (ex.: applied, interview).
        status: String,

        /// Notas enviadas junto com a mudança.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Executa uma ação sugerida (ex.: Apply, Reject) pelo rótulo.
    Act {
        id: i64,

        /// Rótulo da ação, como mostrado na tabela.
        label: String,
    },

    /// Substitui as notas de uma vaga.
    Notes {
        id: i64,

        text: String,
    },

    /// Lista os status conhecidos.
    Statuses,

    /// Dispara uma busca de vagas e acompanha o progresso.
    Search {
        /// Papel a buscar; omitido busca todos os papéis-alvo.
        #[arg(long)]
        role: Option<String>,

        /// Não acompanha o progresso depois de iniciar.
        #[arg(long, default_value_t = false)]
        detach: bool,
    },

    /// Exporta todas as vagas para um arquivo CSV.
    Export {
        /// Arquivo de saída.
        #[arg(long, short, default_value = crate::export::DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },

    /// Abre uma sessão interativa com tabela, quadro e painel de detalhes.
    Shell,
}
