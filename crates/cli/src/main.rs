use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use safra_api::{AgroClient, COOKIE_ENV, CSRF_TOKEN_ENV};
use safra_engine::cascade::NO_PRODUCTS_NOTICE;
use safra_engine::plan::REDIRECT_DELAY_MS;
use safra_engine::{CatalogProvider, Endpoints, FetchError, FichaView, HttpCatalog, PlanoView};
use safra_types::SelectableItem;

#[derive(Parser)]
#[command(name = "safra", version, about = "Cliente de planejamento agrícola")]
struct Cli {
    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Lista os estados disponíveis
    Estados,
    /// Lista as cidades de um estado
    Cidades { state_id: i64 },
    /// Lista os cultivos com ficha técnica em uma cidade
    Produtos { city_id: i64 },
    /// Busca a ficha técnica de um cultivo em uma cidade
    Ficha { produto: String, city_id: i64 },
    /// Lista os terrenos cadastrados
    Terrenos,
    /// Lista os planos de plantio existentes
    Planos,
    /// Inicia um plano de plantio para um terreno
    IniciarPlano { terreno_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let client = AgroClient::from_env()?;
    let endpoints = Endpoints::from_env().context("resolve endpoint configuration")?;
    let catalog = HttpCatalog::new(client.clone(), endpoints);

    // No subcommand => TUI
    let Some(command) = cli.command else {
        return safra_tui::run(Arc::new(catalog), client).await;
    };

    match command {
        Command::Estados => {
            let states = catalog.list_states().await?;
            print_items(&states, cli.json)?;
        }
        Command::Cidades { state_id } => {
            let cities = catalog.list_cities(&state_id.into()).await?;
            print_items(&cities, cli.json)?;
        }
        Command::Produtos { city_id } => {
            let products = catalog.list_products(&city_id.into()).await?;
            if products.is_empty() && !cli.json {
                println!("{}", NO_PRODUCTS_NOTICE);
            } else {
                print_items(&products, cli.json)?;
            }
        }
        Command::Ficha { produto, city_id } => {
            match catalog.fetch_ficha(&produto, &city_id.into()).await {
                Ok(ficha) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&ficha)?);
                    } else {
                        print_ficha(&FichaView::from_ficha(&ficha));
                    }
                }
                Err(FetchError::NotFound) => {
                    println!("Ficha Técnica não encontrada para a seleção.");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Terrenos => {
            let terrenos = catalog.list_terrenos().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&terrenos)?);
            } else if terrenos.is_empty() {
                println!("Nenhum terreno cadastrado.");
            } else {
                for t in &terrenos {
                    println!(
                        "{:>6}  {} — {} {} ({})",
                        t.id, t.nome, t.area_total, t.unidade_area, t.localizacao_display
                    );
                }
            }
        }
        Command::Planos => {
            let planos = catalog.list_planos().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&planos)?);
            } else if planos.is_empty() {
                println!("Nenhum plano de plantio ainda.");
            } else {
                for plano in planos.iter().map(PlanoView::from_resumo) {
                    println!("{} [{}]", plano.nome, plano.status);
                    println!(
                        "    Cultivo: {} | Terreno: {} | {} | Início: {}",
                        plano.cultivo, plano.terreno, plano.localizacao, plano.inicio
                    );
                }
            }
        }
        Command::IniciarPlano { terreno_id } => {
            iniciar_plano(&catalog, &client, terreno_id).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_items(items: &[SelectableItem], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    for item in items {
        println!("{:>10}  {}", item.id.to_string(), item.label);
    }
    Ok(())
}

fn print_ficha(view: &FichaView) {
    println!("{}", view.title);
    for section in &view.sections {
        println!("\n== {} ==", section.title);
        for field in &section.fields {
            let line = format!("{}: {}", field.label, field.value);
            for wrapped in textwrap::wrap(&line, 78) {
                println!("  {}", wrapped);
            }
        }
    }
}

/// Mirrors the wizard's submit contract: the anti-forgery token is a hard
/// precondition, success pauses before surfacing the next step, and logical
/// failures carry the server's message.
async fn iniciar_plano(catalog: &HttpCatalog, client: &AgroClient, terreno_id: i64) -> Result<()> {
    let Some(token) = client.csrf_token() else {
        bail!(
            "token de segurança ausente: defina {} ou informe cookies via {}",
            CSRF_TOKEN_ENV,
            COOKIE_ENV
        );
    };

    let resp = catalog.criar_plano(terreno_id, &token).await?;
    if resp.success && let Some(next_url) = resp.next_url {
        println!(
            "{}",
            resp.message.unwrap_or_else(|| "Plano criado com sucesso.".into())
        );
        tokio::time::sleep(Duration::from_millis(REDIRECT_DELAY_MS)).await;
        println!("Continue em: {}{}", client.base_url(), next_url);
        Ok(())
    } else {
        let message = resp
            .error
            .or(resp.message)
            .unwrap_or_else(|| "Não foi possível iniciar o plano.".into());
        bail!(message);
    }
}
