//! Layer probe CLI.
//!
//! Command-line stand-in for the viewer UI: takes the connection parameters a
//! user would type into the configuration panel, queries the server for layer
//! metadata, and prints the legend URL plus a sample tile request so a WMS
//! layer configuration can be verified end to end.

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wms_client::CapabilitiesClient;
use wms_common::{LayerDescriptor, ServerLocator};
use wms_protocol::getmap::{getmap_url, rewrite_tile_url, tile_bounds, TileParams};
use wms_protocol::legend::legend_url;

#[derive(Parser, Debug)]
#[command(name = "layer-probe")]
#[command(about = "Inspect a GeoServer WMS layer and print its tile request URLs")]
struct Args {
    /// GeoServer base URL, e.g. https://example.org/geoserver
    #[arg(long, env = "GEOSERVER_URL")]
    server_url: String,

    /// Workspace containing the layer
    #[arg(short, long)]
    workspace: String,

    /// Layer name within the workspace
    #[arg(short, long)]
    layer: String,

    /// Coordinate reference system for tile requests
    #[arg(long, default_value = "EPSG:3857")]
    crs: String,

    /// Style name (empty = server default style)
    #[arg(long)]
    style: Option<String>,

    /// Override the legend heading (default: layer title from the server)
    #[arg(long)]
    legend_title: Option<String>,

    /// Zoom level for the sample tile URL
    #[arg(long, default_value = "0")]
    zoom: u32,

    /// Tile size in pixels
    #[arg(long, default_value = "256")]
    tile_size: u32,

    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let locator = ServerLocator::new(&args.server_url, &args.workspace, &args.layer);
    info!(layer = %locator.qualified_name(), server = %locator.base_url, "probing layer");

    let client = CapabilitiesClient::new()?;

    // One fetch per metadata kind, mirroring how the viewer issues its
    // independent lookups.
    let title = client.layer_title(&locator).await;
    let styles = client.layer_styles(&locator).await;
    let bounds = client.layer_bounds(&locator).await;

    let params = TileParams::new(locator.qualified_name(), args.crs.as_str(), args.style.clone());
    info!(version = %params.version, crs = %params.crs, "tile request configuration");

    let legend = legend_url(&locator, args.style.as_deref());
    let bbox = tile_bounds(args.zoom, 0, 0);
    let base = getmap_url(
        &locator.wms_endpoint(),
        &params,
        &bbox,
        args.tile_size,
        args.tile_size,
    );
    let tile = rewrite_tile_url(&base, &params);

    if args.output == "json" {
        let descriptor = LayerDescriptor {
            title: title.clone(),
            styles,
            bounds,
        };
        let report = serde_json::json!({
            "layer": locator.qualified_name(),
            "descriptor": descriptor,
            "legend_url": legend,
            "sample_tile_url": tile,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Layer:  {}", locator.qualified_name());
    println!("Title:  {}", title.as_deref().unwrap_or("(unavailable)"));

    match bounds {
        Some(b) => println!(
            "Bounds: {:.4}°S {:.4}°W .. {:.4}°N {:.4}°E",
            b.south, b.west, b.north, b.east
        ),
        None => println!("Bounds: (unavailable)"),
    }

    if styles.is_empty() {
        println!("Styles: none advertised (server default applies)");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Style", "Title"]);
        for style in &styles {
            table.add_row(vec![style.name.clone(), style.title.clone()]);
        }
        println!("{table}");
    }

    let heading = args
        .legend_title
        .or(title)
        .unwrap_or_else(|| "Legend".to_string());
    println!("\nLegend ({heading}):");
    println!("  {legend}");

    println!("\nSample tile ({}/0/0):", args.zoom);
    println!("  {tile}");

    Ok(())
}
