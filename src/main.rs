use std::collections::HashSet;
use std::path::Path;

use doc_cleaner::{
    emit_cleaned, enumerate_inputs, load_settings, CleaningOverrides, DocumentCleaner,
    EmptyDocumentRemover, IdGenerator, Settings,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Simple CLI flags parsing
    let args: Vec<String> = std::env::args().collect();
    let keep_ids = args.iter().any(|a| a == "--keep-ids");
    let drop_empty = args.iter().any(|a| a == "--drop-empty");

    let mut settings_path = String::from("cleaner.yaml");
    if let Some(pos) = args.iter().position(|a| a == "--settings") {
        if let Some(val) = args.get(pos + 1) {
            if !val.starts_with("--") {
                settings_path = val.clone();
            }
        }
    }
    let mut input_glob_flag: Option<String> = None;
    if let Some(pos) = args.iter().position(|a| a == "--input") {
        if let Some(val) = args.get(pos + 1) {
            if !val.starts_with("--") {
                input_glob_flag = Some(val.clone());
            }
        }
    }
    let mut outdir_flag: Option<String> = None;
    if let Some(pos) = args.iter().position(|a| a == "--outdir") {
        if let Some(val) = args.get(pos + 1) {
            if !val.starts_with("--") {
                outdir_flag = Some(val.clone());
            }
        }
    }

    // Per-run stage overrides
    let mut overrides = CleaningOverrides::default();
    if args.iter().any(|a| a == "--keep-empty-lines") {
        overrides.remove_empty_lines = Some(false);
    }
    if args.iter().any(|a| a == "--keep-extra-whitespaces") {
        overrides.remove_extra_whitespaces = Some(false);
    }
    if args.iter().any(|a| a == "--repeated-substrings") {
        overrides.remove_repeated_substrings = Some(true);
    }
    let mut substrings: Vec<String> = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        if arg == "--remove-substring" {
            if let Some(val) = args.get(i + 1) {
                substrings.push(val.clone());
            }
        }
    }
    if !substrings.is_empty() {
        overrides.remove_substrings = Some(substrings);
    }
    if let Some(pos) = args.iter().position(|a| a == "--remove-regex") {
        if let Some(val) = args.get(pos + 1) {
            overrides.remove_regex = Some(val.clone());
        }
    }

    // 1) Settings: load when the file exists, defaults otherwise
    let settings = if Path::new(&settings_path).exists() {
        match load_settings(Path::new(&settings_path)) {
            Ok(s) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "load_settings",
                        "file": settings_path,
                        "status": "ok",
                        "input_glob": s.input_glob(),
                        "output_dir": s.output_dir()
                    })
                );
                s
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "load_settings",
                        "file": settings_path,
                        "error": e.to_string()
                    })
                );
                std::process::exit(3);
            }
        }
    } else {
        Settings::default()
    };

    // 2) Build the cleaner from settings
    let mut cleaner = match DocumentCleaner::from_params(&settings.cleaner_params()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({
                    "tool": "build_cleaner",
                    "error": e.to_string()
                })
            );
            std::process::exit(3);
        }
    };
    if keep_ids {
        cleaner.id_generator = IdGenerator::keep();
    }

    // 3) Enumerate input document files
    let input_glob = input_glob_flag.unwrap_or_else(|| settings.input_glob());
    let outdir = outdir_flag.unwrap_or_else(|| settings.output_dir());

    let files = match enumerate_inputs(&input_glob) {
        Ok(files) => files,
        Err(doc_cleaner::EnumerateError::NoFilesFound { guidance }) => {
            eprintln!(
                "{}",
                serde_json::json!({
                    "tool": "enumerate_inputs",
                    "glob": input_glob,
                    "error": "NoFilesFound"
                })
            );
            eprintln!("{}", guidance);
            std::process::exit(2);
        }
    };
    eprintln!(
        "{}",
        serde_json::json!({
            "tool": "enumerate_inputs",
            "count": files.len()
        })
    );

    // 4) Clean each file and emit results
    let remover = EmptyDocumentRemover;
    let mut used_stems: HashSet<String> = HashSet::new();
    let mut failures = 0usize;
    let mut total_in = 0usize;
    let mut total_out = 0usize;

    for file in files {
        let fname = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("batch")
            .to_string();
        let stem = unique_stem(slugify(&fname), &mut used_stems);

        let raw = match std::fs::read_to_string(&file) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "read_input",
                        "file": file,
                        "error": e.to_string()
                    })
                );
                failures += 1;
                continue;
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "parse_input",
                        "file": file,
                        "error": e.to_string()
                    })
                );
                failures += 1;
                continue;
            }
        };

        let value = if drop_empty {
            match remover.run_value(&value) {
                Ok(kept) => match serde_json::to_value(&kept.documents) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!(
                            "{}",
                            serde_json::json!({
                                "tool": "drop_empty",
                                "file": file,
                                "error": e.to_string()
                            })
                        );
                        failures += 1;
                        continue;
                    }
                },
                Err(e) => {
                    eprintln!(
                        "{}",
                        serde_json::json!({
                            "tool": "drop_empty",
                            "file": file,
                            "error": e.to_string()
                        })
                    );
                    failures += 1;
                    continue;
                }
            }
        } else {
            value
        };

        let in_count = value.as_array().map(|a| a.len()).unwrap_or(0);
        let cleaned = match cleaner.run_value_with(&value, &overrides) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "clean_documents",
                        "file": file,
                        "error": e.to_string()
                    })
                );
                failures += 1;
                continue;
            }
        };

        let report = serde_json::json!({
            "source": file,
            "documents_in": in_count,
            "documents_out": cleaned.documents.len(),
            "dropped_empty": drop_empty,
            "cleaner": cleaner.to_config(),
        });
        match emit_cleaned(&cleaned, &report, &outdir, &stem) {
            Ok(paths) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "emit_cleaned",
                        "file": file,
                        "docs_path": paths.docs_path,
                        "report_path": paths.report_path
                    })
                );
                total_in += in_count;
                total_out += cleaned.documents.len();
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "tool": "emit_cleaned",
                        "file": file,
                        "error": e.to_string()
                    })
                );
                failures += 1;
            }
        }
    }

    println!(
        "{}",
        serde_json::json!({
            "settings_id": settings.id,
            "documents_in": total_in,
            "documents_out": total_out,
            "failures": failures,
            "outdir": outdir
        })
    );
    if failures > 0 {
        std::process::exit(1);
    }
}

fn slugify(base: &str) -> String {
    let lower = base.to_lowercase();
    let mut s = String::with_capacity(lower.len());
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            s.push(ch);
        } else {
            s.push('-');
        }
    }
    let trimmed = s.trim_matches('-').to_string();
    let mut collapsed = String::with_capacity(trimmed.len());
    let mut prev_dash = false;
    for ch in trimmed.chars() {
        if ch == '-' {
            if !prev_dash {
                collapsed.push(ch);
            }
            prev_dash = true;
        } else {
            prev_dash = false;
            collapsed.push(ch);
        }
    }
    if collapsed.is_empty() {
        "batch".to_string()
    } else {
        collapsed
    }
}

fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    if !used.contains(&stem) {
        used.insert(stem.clone());
        return stem;
    }
    let mut i = 1;
    loop {
        let candidate = format!("{}-{}", stem, i);
        if !used.contains(&candidate) {
            used.insert(candidate.clone());
            return candidate;
        }
        i += 1;
    }
}
