use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;
use regex_playground::cli::Cli;
use regex_playground::discover::discover_chapters;
use regex_playground::lesson::parse_lesson_file;
use regex_playground::logger::{level_for_verbosity, Logger};
use regex_playground::output::Output;
use regex_playground::runner::{
    run_chapter, run_from_stdin, try_pattern, ChapterResult, ProgressEvent,
};
use regex_playground::update::update_lesson_file;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    Logger::init(level_for_verbosity(cli.verbose)).context("failed to install logger")?;

    let use_color = !cli.no_color && atty::is(atty::Stream::Stdout);
    let mut output = Output::new(use_color);

    if let Some(pattern) = &cli.try_pattern {
        let input = match &cli.input {
            Some(input) => input.clone(),
            None => {
                let content = read_stdin()?;
                content
                    .strip_suffix('\n')
                    .map(str::to_string)
                    .unwrap_or(content)
            }
        };
        let matcher = try_pattern(pattern, &input, cli.match_options())?;
        output.print_matches(&matcher);
        return Ok(());
    }

    let from_stdin = cli.lesson_root.as_os_str() == "-";
    let root = cli
        .lesson_root
        .canonicalize()
        .unwrap_or(cli.lesson_root.clone());

    if cli.list && !from_stdin {
        list_lessons(&root, cli.filter.as_deref(), &mut output)?;
        return Ok(());
    }

    let start_time = Instant::now();

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>();
    let verbose = cli.verbose >= 1;
    let update = cli.update;
    let progress_handle = thread::spawn(move || {
        let mut output = Output::new(use_color);
        for event in progress_rx {
            output.print_progress(&event, verbose, update);
        }
        output.finish_progress();
    });

    let filter = cli.filter.as_deref();
    let results: Vec<ChapterResult> = if from_stdin {
        let content = read_stdin()?;
        vec![run_from_stdin(&content, filter, Some(&progress_tx))]
    } else {
        let chapters = discover_chapters(&root)
            .with_context(|| format!("failed to discover lessons in {}", root.display()))?;
        if chapters.is_empty() {
            eprintln!("No lessons found in {}", root.display());
            std::process::exit(1);
        }

        if cli.sequential || chapters.len() == 1 {
            chapters
                .iter()
                .map(|chapter| run_chapter(chapter, filter, Some(&progress_tx)))
                .collect()
        } else {
            chapters
                .par_iter()
                .map(|chapter| {
                    let tx = progress_tx.clone();
                    run_chapter(chapter, filter, Some(&tx))
                })
                .collect()
        }
    };

    drop(progress_tx);
    if progress_handle.join().is_err() {
        anyhow::bail!("progress output thread panicked");
    }

    if cli.update && !from_stdin {
        for chapter_result in &results {
            for file_result in &chapter_result.file_results {
                let failed: Vec<_> = file_result
                    .results
                    .iter()
                    .filter(|r| !r.passed && r.actual.is_some())
                    .collect();

                if !failed.is_empty() {
                    update_lesson_file(&file_result.file_path, &failed).with_context(|| {
                        format!("failed to update {}", file_result.file_path.display())
                    })?;
                    eprintln!("Updated: {}", file_result.file_path.display());
                }
            }
        }
    }

    let elapsed = start_time.elapsed();
    output.print_results(&results, elapsed, cli.update);

    let all_passed = results.iter().all(|r| r.passed());
    std::process::exit(if all_passed { 0 } else { 1 });
}

fn read_stdin() -> anyhow::Result<String> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("failed to read stdin")?;
    Ok(content)
}

fn list_lessons(root: &Path, filter: Option<&str>, output: &mut Output) -> anyhow::Result<()> {
    let chapters = discover_chapters(root)?;

    let mut chapter_lessons = Vec::new();
    for chapter in &chapters {
        let mut all_lessons = Vec::new();
        for file in chapter.lesson_files() {
            let lessons = parse_lesson_file(&file)?;

            let file_matches = filter.map_or(true, |pat| {
                file.file_stem()
                    .and_then(|s| s.to_str())
                    .map_or(false, |name| name.contains(pat))
            });

            all_lessons.extend(
                lessons
                    .into_iter()
                    .filter(|l| file_matches || filter.map_or(true, |pat| l.name.contains(pat))),
            );
        }

        if !all_lessons.is_empty() || filter.is_none() {
            chapter_lessons.push((chapter, all_lessons));
        }
    }

    output.print_list(&chapter_lessons);
    Ok(())
}
