use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cara_api::Args::parse();

	cara_api::run(args).await
}
