fn main() -> anyhow::Result<()> {
    kana_review_lib::run()
}
