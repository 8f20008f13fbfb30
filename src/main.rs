use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use std::path::Path;
use vitals_triage::config::{Cli, Commands, Config};
use vitals_triage::dataset;
use vitals_triage::diagnosis::{PatientObservation, RiskScorer};
use vitals_triage::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load_with_cli(cli.clone())?;

    // 初始化日志系统（guard 需持有到进程退出）
    let _log_guard = config.init_logging()?;

    // 未指定子命令时默认启动服务
    let command = cli.command.unwrap_or(Commands::Serve);
    handle_command(command, &config).await
}

async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Serve => {
            tracing::info!("Vitals Triage Starting...");
            let server = Server::new(config)?;
            tracing::info!("Vitals Triage Ready!");
            server.run().await?;
        }
        Commands::Score {
            age,
            temperature,
            heart_rate,
            spo2,
            cough,
            fever,
            breathing_issue,
        } => {
            let observation = PatientObservation {
                age,
                temperature,
                heart_rate,
                spo2,
                cough,
                fever,
                breathing_issue,
            };
            let result = RiskScorer::new().score(&observation);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::GenerateDataset {
            output,
            patients,
            seed,
        } => {
            let output = output.unwrap_or_else(|| config.dataset.output.clone());
            let patients = patients.unwrap_or(config.dataset.patients);
            let seed = seed.unwrap_or(config.dataset.seed);
            if patients == 0 {
                return Err(anyhow!("病人数量必须大于 0"));
            }

            let records = dataset::generate(patients, seed);
            dataset::save_csv(&output, &records)?;
            print_label_distribution(&records);
            println!("已生成 {} 条记录: {}", records.len(), output.display());
        }
        Commands::Evaluate { input } => {
            let report = evaluate_file(&input)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ResetConfig => {
            // 重置配置
            let default_config = Config::default();
            if let Some(config_path) = Config::get_user_config_path() {
                default_config.save_to_file(&config_path)?;
                println!("配置已重置到: {}", config_path.display());
            } else {
                println!("无法确定配置文件路径");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vitals-triage", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn evaluate_file(path: &Path) -> Result<dataset::EvaluationReport> {
    let records = dataset::load_csv(path)
        .map_err(|e| anyhow!("读取数据集失败 {}: {}", path.display(), e))?;
    Ok(dataset::evaluate(&records, &RiskScorer::new())?)
}

fn print_label_distribution(records: &[dataset::PatientRecord]) {
    println!("标签分布:");
    for label in vitals_triage::diagnosis::DiagnosisLabel::ALL {
        let count = records.iter().filter(|r| r.diagnosis == label).count();
        println!("  {label}: {count}");
    }
}
