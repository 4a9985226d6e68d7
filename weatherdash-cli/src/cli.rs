use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Password, Select, Text};
use weatherdash_core::{
    ApiError, Config, Dashboard, FavoriteEntry, ProviderId, Query,
    advice::ClothingAdvisor,
    alerts::{AlertKind, AlertStore, Comparison, NewAlert},
    analytics::{self, Analytics, ExportFormat, TimeRange},
    compare::CityComparison,
    favorites::{FavoritesStore, Toggle},
    geocode::{CitySearch, Debouncer, OpenCageGeocoder},
    history::{HistoryStore, RemoteHistory},
    map::{self, WeatherMap},
    provider::default_provider_from_config,
    storage::LocalStore,
    theme::{self, THEMES},
};

use crate::{complete::CityCompleter, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the weather provider and credentials.
    Configure {
        /// Provider short name, e.g. "backend" or "openweather".
        provider: String,
    },

    /// Show current weather for a city or "lat,lon". Prompts when omitted.
    Search {
        city: Option<String>,

        /// Also show the 5-day forecast.
        #[arg(long)]
        forecast: bool,

        /// Ask the backend for clothing advice.
        #[arg(long)]
        advice: bool,
    },

    /// List city name suggestions for a partial query.
    Suggest { query: String },

    /// Search history stored by the backend.
    #[command(subcommand)]
    History(HistoryCommand),

    /// Locally saved favorite cities.
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Weather alert rules.
    #[command(subcommand)]
    Alerts(AlertsCommand),

    /// Compare current weather across cities.
    Compare {
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Statistics over the search history.
    Analytics {
        #[arg(long, value_enum, default_value_t = RangeArg::Week)]
        range: RangeArg,

        /// Write the history to a file instead of printing statistics.
        #[arg(long, value_enum)]
        export: Option<FormatArg>,

        /// Export destination; defaults to weather-analytics-<range>.<ext>.
        #[arg(long, requires = "export")]
        out: Option<PathBuf>,
    },

    /// Temperature and wind over time.
    Trends {
        #[arg(long)]
        city: Option<String>,
    },

    /// Averages over the last seven searches.
    Stats,

    /// Weather for the major cities on the map.
    Map {
        /// City to drop a marker on; lists the catalog when omitted.
        city: Option<String>,
    },

    /// Show or choose the color theme.
    Theme {
        #[arg(long)]
        select: bool,

        /// City whose weather drives the "auto" theme.
        #[arg(long)]
        city: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    List {
        /// Show every entry instead of the latest five.
        #[arg(long)]
        all: bool,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    Rename {
        id: String,
        city: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    List,
    /// Add the city if it is not a favorite, remove it otherwise.
    Toggle {
        city: String,
    },
    Remove {
        city: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    List,
    /// Add a rule; missing fields are prompted for.
    Add(AddAlert),
    Toggle {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct AddAlert {
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    #[arg(long, value_enum)]
    condition: Option<ConditionArg>,
    #[arg(long)]
    value: Option<f64>,
    #[arg(long)]
    city: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Week,
    Month,
    All,
}

impl From<RangeArg> for TimeRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::Week => TimeRange::Week,
            RangeArg::Month => TimeRange::Month,
            RangeArg::All => TimeRange::All,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Temperature,
    Humidity,
    Wind,
    Rain,
}

impl From<KindArg> for AlertKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Temperature => AlertKind::Temperature,
            KindArg::Humidity => AlertKind::Humidity,
            KindArg::Wind => AlertKind::WindSpeed,
            KindArg::Rain => AlertKind::Rain,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    Above,
    Below,
}

impl From<ConditionArg> for Comparison {
    fn from(value: ConditionArg) -> Self {
        match value {
            ConditionArg::Above => Comparison::Above,
            ConditionArg::Below => Comparison::Below,
        }
    }
}

/// Show the dashboard wording for request failures; details go to the log.
fn user_error(err: ApiError) -> anyhow::Error {
    tracing::debug!(error = %err, "request failed");
    anyhow!(err.user_message())
}

fn open_dashboard(config: &Config) -> Result<Dashboard> {
    let source = default_provider_from_config(config)?;
    let store = LocalStore::new(Config::data_dir()?);
    tracing::debug!(dir = %store.dir().display(), "using local storage");

    let history = HistoryStore::new(Box::new(RemoteHistory::new(config.backend_url())?), store.clone())?;
    let favorites = FavoritesStore::load(store.clone())?;
    let alerts = AlertStore::load(store)?;

    Ok(Dashboard::new(source, history, favorites, alerts)
        .with_advisor(ClothingAdvisor::new(config.suggest_url())?))
}

fn geocoder(config: &Config) -> Result<Option<Arc<dyn CitySearch>>> {
    match config.geocoder_api_key() {
        Some(key) => {
            let search: Arc<dyn CitySearch> = Arc::new(OpenCageGeocoder::new(key.to_owned())?);
            Ok(Some(search))
        }
        None => Ok(None),
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { provider } => configure(&mut config, &provider)?,
            Command::Search { city, forecast, advice } => {
                let mut dash = open_dashboard(&config)?;
                search(&mut dash, &config, city, forecast, advice).await?;
            }
            Command::Suggest { query } => {
                let search = geocoder(&config)?.ok_or_else(|| {
                    anyhow!(
                        "No geocoder API key configured.\n\
                         Hint: run `weatherdash configure backend` and enter an OpenCage key."
                    )
                })?;
                let found = Debouncer::default()
                    .suggest(search.as_ref(), &query)
                    .await
                    .map_err(user_error)?
                    .unwrap_or_default();
                if found.is_empty() {
                    println!("No suggestions.");
                }
                for city in found {
                    println!("{city}");
                }
            }
            Command::History(cmd) => history(&mut open_dashboard(&config)?, cmd).await?,
            Command::Favorites(cmd) => favorites(&mut open_dashboard(&config)?, cmd).await?,
            Command::Alerts(cmd) => alerts(&mut open_dashboard(&config)?, cmd)?,
            Command::Compare { cities } => {
                let source = default_provider_from_config(&config)?;
                let mut comparison = CityComparison::new();
                for city in &cities {
                    if let Err(err) = comparison.add(city, source.as_ref()).await {
                        eprintln!("{city}: {err}");
                    }
                }
                output::comparison(comparison.cities(), comparison.summary().as_ref());
            }
            Command::Analytics { range, export, out } => {
                let mut dash = open_dashboard(&config)?;
                refresh_history(&mut dash).await;
                let entries = dash.history().entries();
                let range = TimeRange::from(range);

                match export {
                    Some(format) => {
                        let format = ExportFormat::from(format);
                        let path = out.unwrap_or_else(|| PathBuf::from(analytics::export_file_name(range, format)));
                        let body = analytics::export(entries, format)?;
                        std::fs::write(&path, body)
                            .with_context(|| format!("Failed to write export file: {}", path.display()))?;
                        println!("Exported {} entries to {}", entries.len(), path.display());
                    }
                    None => match Analytics::from_history(entries, range, Utc::now()) {
                        Some(a) => output::analytics(&a),
                        None => println!("No data available for analytics."),
                    },
                }
            }
            Command::Trends { city } => {
                let mut dash = open_dashboard(&config)?;
                refresh_history(&mut dash).await;
                let trends = analytics::trends(dash.history().entries(), city.as_deref());
                output::trends(&trends);
            }
            Command::Stats => {
                let mut dash = open_dashboard(&config)?;
                refresh_history(&mut dash).await;
                match analytics::recent_stats(dash.history().entries()) {
                    Some(stats) => output::recent_stats(&stats),
                    None => println!("No search history yet."),
                }
            }
            Command::Map { city } => match city {
                None => {
                    for c in map::MAJOR_CITIES.iter() {
                        let quick = map::quick_cities().contains(c);
                        println!("{} {:<16} ({:.4}, {:.4})", if quick { "*" } else { " " }, c.name, c.lat, c.lon);
                    }
                }
                Some(city) => {
                    let source = default_provider_from_config(&config)?;
                    let mut weather_map = WeatherMap::new();
                    let marker = weather_map.fetch(&city, source.as_ref()).await?;
                    output::marker(marker);
                }
            },
            Command::Theme { select, city } => theme_cmd(&mut config, select, city).await?,
        }

        Ok(())
    }
}

fn configure(config: &mut Config, provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    if id.requires_api_key() {
        let key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        if key.trim().is_empty() {
            bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(id, key.trim().to_string());
    } else {
        let url = Text::new("Backend URL:")
            .with_default(config.backend_url())
            .prompt()
            .context("Failed to read backend URL")?;
        config.backend_url = Some(url.trim().to_string());
    }
    config.set_default_provider(id);

    let geo = Text::new("OpenCage API key for autocomplete (leave empty to skip):")
        .prompt()
        .context("Failed to read geocoder key")?;
    if !geo.trim().is_empty() {
        config.geocoder = Some(weatherdash_core::ProviderConfig { api_key: geo.trim().to_string() });
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(
    dash: &mut Dashboard,
    config: &Config,
    city: Option<String>,
    with_forecast: bool,
    with_advice: bool,
) -> Result<()> {
    let input = match city {
        Some(c) => c,
        None => {
            let completer = city_completer(dash, config).await?;
            tokio::task::block_in_place(|| {
                Text::new("City:").with_autocomplete(completer).prompt()
            })
            .context("Failed to read city")?
        }
    };

    let outcome = dash.search(&input, Utc::now()).await.map_err(user_error)?;
    output::search_outcome(&outcome);

    if with_advice {
        if let Some(suggestion) = dash.clothing_suggestion(&outcome.record).await {
            println!("  👕 {suggestion}");
        }
    }

    if with_forecast {
        match dash.forecast(&outcome.record.city).await {
            Ok(f) => {
                println!();
                output::forecast(&f);
            }
            Err(err) => eprintln!("Forecast unavailable: {}", user_error(err)),
        }
    }
    Ok(())
}

/// Autocomplete seeded with the cities from the latest history list.
async fn city_completer(dash: &mut Dashboard, config: &Config) -> Result<CityCompleter> {
    refresh_history(dash).await;
    Ok(CityCompleter::new(
        tokio::runtime::Handle::current(),
        geocoder(config)?,
        dash.history().recent_cities(),
    ))
}

async fn refresh_history(dash: &mut Dashboard) {
    if let Err(err) = dash.history_mut().refresh().await {
        eprintln!("Using cached history: {err:#}");
    }
}

async fn history(dash: &mut Dashboard, cmd: HistoryCommand) -> Result<()> {
    match cmd {
        HistoryCommand::List { all } => {
            refresh_history(dash).await;
            let store = dash.history();
            let shown = store.visible(all);
            output::history(shown, store.entries().len() - shown.len());
        }
        HistoryCommand::Show { id } => {
            refresh_history(dash).await;
            let entry = dash.open_history(&id).ok_or_else(|| anyhow!("No history entry with id {id}"))?;
            output::history_entry(entry);
        }
        HistoryCommand::Delete { id, yes } => {
            let confirmed = yes
                || Confirm::new(&format!("Delete history entry {id}?"))
                    .with_default(false)
                    .prompt()
                    .context("Failed to read confirmation")?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
            dash.history_mut().delete(&id).await?;
            println!("Deleted {id}.");
        }
        HistoryCommand::Rename { id, city } => match dash.history_mut().rename(&id, &city).await? {
            Some(entry) => output::history_entry(&entry),
            None => println!("Renamed {id} to {}.", city.trim()),
        },
    }
    Ok(())
}

async fn favorites(dash: &mut Dashboard, cmd: FavoritesCommand) -> Result<()> {
    match cmd {
        FavoritesCommand::List => output::favorites(dash.favorites().list()),
        FavoritesCommand::Toggle { city } => {
            let entry = match dash.favorites().get(city.trim()) {
                Some(existing) => existing.clone(),
                None => {
                    let query = Query::parse(&city).ok_or_else(|| user_error(ApiError::EmptyQuery))?;
                    let record = dash.source().current(&query).await.map_err(user_error)?;
                    FavoriteEntry::from(&record)
                }
            };
            let name = entry.city.clone();
            match dash.favorites_mut().toggle(entry)? {
                Toggle::Added => println!("Added {name} to favorites."),
                Toggle::Removed => println!("Removed {name} from favorites."),
            }
        }
        FavoritesCommand::Remove { city } => {
            if dash.favorites_mut().remove(city.trim())? {
                println!("Removed {} from favorites.", city.trim());
            } else {
                println!("{} is not a favorite.", city.trim());
            }
        }
    }
    Ok(())
}

fn alerts(dash: &mut Dashboard, cmd: AlertsCommand) -> Result<()> {
    let store = dash.alerts_mut();
    match cmd {
        AlertsCommand::List => output::alerts(store.list()),
        AlertsCommand::Add(args) => {
            let new = prompt_alert(args)?;
            let alert = store.add(new, Utc::now())?;
            println!("Added alert {}: {} {} in {}", alert.id, alert.kind.label(), alert.summary(), alert.city);
        }
        AlertsCommand::Toggle { id } => match store.toggle(id)? {
            Some(true) => println!("Alert {id} enabled."),
            Some(false) => println!("Alert {id} disabled."),
            None => bail!("No alert with id {id}"),
        },
        AlertsCommand::Delete { id } => {
            if !store.delete(id)? {
                bail!("No alert with id {id}");
            }
            println!("Deleted alert {id}.");
        }
    }
    Ok(())
}

fn prompt_alert(args: AddAlert) -> Result<NewAlert> {
    let kind = match args.kind {
        Some(k) => AlertKind::from(k),
        None => {
            let kinds = [AlertKind::Temperature, AlertKind::Humidity, AlertKind::WindSpeed, AlertKind::Rain];
            let choice = Select::new("Alert type:", kinds.iter().map(|k| k.label()).collect())
                .raw_prompt()
                .context("Failed to read alert type")?;
            kinds[choice.index]
        }
    };

    let condition = match args.condition {
        Some(c) => Comparison::from(c),
        None if kind == AlertKind::Rain => Comparison::Above,
        None => Select::new("Condition:", vec![Comparison::Above, Comparison::Below])
            .prompt()
            .context("Failed to read condition")?,
    };

    let value = match args.value {
        Some(v) => Some(v),
        None if kind.needs_value() => Some(
            CustomType::<f64>::new(&format!("Threshold ({}):", kind.unit()))
                .prompt()
                .context("Failed to read threshold")?,
        ),
        None => None,
    };

    let city = match args.city {
        Some(c) => c,
        None => Text::new("City:").prompt().context("Failed to read city")?,
    };

    Ok(NewAlert { kind, condition, value, city })
}

async fn theme_cmd(config: &mut Config, select: bool, city: Option<String>) -> Result<()> {
    if select {
        let current = THEMES.iter().position(|t| t.id == config.theme()).unwrap_or(0);
        let labels: Vec<String> = THEMES.iter().map(|t| format!("{} ({})", t.name, t.description)).collect();
        let choice = Select::new("Theme:", labels)
            .with_starting_cursor(current)
            .raw_prompt()
            .context("Failed to read theme")?;
        config.set_theme(THEMES[choice.index].id)?;
        config.save()?;
    }

    let description = match city {
        Some(c) => {
            let source = default_provider_from_config(config)?;
            let query = Query::parse(&c).ok_or_else(|| user_error(ApiError::EmptyQuery))?;
            Some(source.current(&query).await.map_err(user_error)?.description)
        }
        None => None,
    };

    let active = theme::active_theme(config.theme(), &Local::now(), description.as_deref());
    match theme::find(&active) {
        Some(t) => println!("Theme: {} ({})", t.name, t.description),
        None => println!("Theme: {active}"),
    }
    Ok(())
}
