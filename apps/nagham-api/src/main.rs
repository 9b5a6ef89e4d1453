use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = nagham_api::Args::parse();
	nagham_api::run(args).await
}
