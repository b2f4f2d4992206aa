//! `nohandcoder read|search|analyze|exec` — run a workspace tool directly,
//! without involving the model.

use nohandcoder_tools::{AnalyzeProjectTool, ExecuteCommandTool, ReadFileTool, SearchFilesTool};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{CliResult, load_config, workspace_for};

pub async fn read(workspace: Option<PathBuf>, file: &str) -> CliResult {
    let config = load_config(workspace)?;
    let tool = ReadFileTool::new(Arc::new(workspace_for(&config)));
    let info = tool.read(file).await?;
    print!("{}", info.content);
    Ok(())
}

pub async fn search(workspace: Option<PathBuf>, pattern: &str, text: &str) -> CliResult {
    let config = load_config(workspace)?;
    let tool = SearchFilesTool::new(Arc::new(workspace_for(&config)));
    let matches = tool.search(pattern, text).await?;
    for m in &matches {
        println!("{}:{}: {}", m.file, m.line, m.content);
    }
    eprintln!("  {} match(es)", matches.len());
    Ok(())
}

pub async fn analyze(workspace: Option<PathBuf>) -> CliResult {
    let config = load_config(workspace)?;
    let tool = AnalyzeProjectTool::new(Arc::new(workspace_for(&config)));
    let structure = tool.analyze().await?;

    println!("  Root:         {}", config.workspace_root().display());
    println!("  Files:        {}", structure.total_files);
    println!("  Directories:  {}", structure.directories.len());
    println!("  Total size:   {} bytes", structure.total_size);
    println!();
    for file in &structure.files {
        println!("  {:>10}  {}", file.size, file.path);
    }
    Ok(())
}

pub async fn exec(workspace: Option<PathBuf>, command: &str) -> CliResult {
    let config = load_config(workspace)?;
    let tool = ExecuteCommandTool::new(Arc::new(workspace_for(&config)))
        .with_timeout(Duration::from_secs(config.command.timeout_secs));
    let output = tool.run(command).await?;

    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    if !output.success {
        let code = output
            .exit_code
            .map_or_else(|| "a signal".to_string(), |c| c.to_string());
        return Err(format!("command exited with {code}").into());
    }
    Ok(())
}
