fn main() -> anyhow::Result<()> {
    interview_cli::cli::main()
}
