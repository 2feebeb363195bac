fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(formsight::run())
}
