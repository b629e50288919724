use anyhow::{Context, Result};
use cb_question_extract::error::AppError;
use cb_question_extract::orchestrator::{App, Inputs};
use cb_question_extract::utils::logging;
use cb_question_extract::Config;
use clap::Parser;
use std::path::PathBuf;
use tracing::error;

/// 从两份试卷中提取题目记录
#[derive(Parser, Debug)]
#[command(name = "cb_question_extract", version, about)]
struct Cli {
    /// Math 试卷（.pdf 或 .txt）
    #[arg(long)]
    math: PathBuf,

    /// Reading and Writing 试卷（.pdf 或 .txt）
    #[arg(long)]
    rw: PathBuf,

    /// 输出 JSON 文件
    #[arg(long)]
    out: PathBuf,

    /// 图片输出目录
    #[arg(long)]
    imgdir: PathBuf,

    /// 输出调试文件
    #[arg(long)]
    debug: bool,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 默认值 → 配置文件 → 环境变量 → 命令行
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)
                .map_err(AppError::from)
                .with_context(|| format!("加载配置失败: {}", path.display()))?,
            None => Config::from_env(),
        };

        config.verbose_logging |= self.verbose;
        config.debug |= self.debug;
        if config.debug_dir == Config::default().debug_dir {
            let parent = self
                .out
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_default();
            config.debug_dir = parent.join("debug");
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.load_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let inputs = Inputs {
        math: cli.math.clone(),
        reading_writing: cli.rw.clone(),
        out: cli.out.clone(),
        image_dir: cli.imgdir.clone(),
    };

    // 初始化并运行应用
    match App::new(config).run(&inputs).await {
        Ok(summary) => {
            println!(
                "Math: {}, R&W: {}, Total: {}",
                summary.math,
                summary.reading_writing,
                summary.total()
            );
            println!("Wrote {} questions to {}", summary.total(), summary.out.display());
            Ok(())
        }
        Err(e) => match e.downcast_ref::<AppError>() {
            Some(AppError::Validation(validation)) => {
                error!("❌ 完整性校验失败");
                eprintln!("{}", validation);
                std::process::exit(1);
            }
            _ => Err(e),
        },
    }
}
