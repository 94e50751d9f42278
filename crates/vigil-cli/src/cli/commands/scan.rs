use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use vigil_cache::ScanCache;
use vigil_common::{Severity, Target, TargetKind};
use vigil_engine::{EngineOptions, SignatureOptions};
use vigil_pipeline::{run_scan, PipelineOptions};
use vigil_report::{build_envelope, TargetMeta};
use vigil_rules::{IndexedRuleEngine, RuleCatalog};

fn target_kind_label(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Skill => "skill",
        TargetKind::Extension => "extension",
        TargetKind::IdeExtension => "ide-extension",
        TargetKind::Mcp => "mcp",
        TargetKind::Path => "path",
    }
}

use crate::cli::args::ScanArgs;
use crate::cli::commands::render::{print_warnings, render};
use crate::config;
use crate::exit_codes::{EXIT_SUCCESS, EXIT_USAGE_ERROR};

pub async fn run(args: &ScanArgs, force_recursive: bool) -> i32 {
    if !args.path.exists() {
        eprintln!("error: path does not exist: {}", args.path.display());
        return EXIT_USAGE_ERROR;
    }

    let fail_on = match &args.fail_on {
        Some(raw) => match Severity::parse(raw) {
            Some(s) => Some(s),
            None => {
                eprintln!("error: invalid --fail-on value: {raw}");
                return EXIT_USAGE_ERROR;
            }
        },
        None => None,
    };

    let tunables = config::pipeline_tunables_from_env();
    let catalog = RuleCatalog::load_default(None);
    let rules = Arc::new(IndexedRuleEngine::build(catalog));

    let mut cache_config = config::cache_config_from_env();
    if !config::cache_enabled_from_env() {
        // ttl_secs <= 0 makes every entry stale the instant it is written,
        // which gives us a no-op cache without a second ScanCache code path.
        cache_config.ttl_secs = 0;
    }
    let cache = Arc::new(ScanCache::load(cache_config, &rules.version).await);

    let mut targets: Vec<Target> = vec![Target::new(
        TargetKind::Path,
        args.path.display().to_string(),
        args.path.display().to_string(),
    )];
    targets.extend(args.skills_dirs.iter().map(|p| {
        Target::new(TargetKind::Skill, p.display().to_string(), p.display().to_string())
    }));
    targets.extend(args.extensions_dirs.iter().map(|p| {
        Target::new(TargetKind::Extension, p.display().to_string(), p.display().to_string())
    }));
    targets.extend(args.ide_extensions_dirs.iter().map(|p| {
        Target::new(
            TargetKind::IdeExtension,
            p.display().to_string(),
            p.display().to_string(),
        )
    }));

    let behavioral = args.use_behavioral && !args.no_behavioral;
    let attach_confidence = args.show_confidence || args.min_confidence.is_some();

    let opts = PipelineOptions {
        parallel_threshold: if tunables.parallel_enabled {
            tunables.parallel_threshold
        } else {
            usize::MAX
        },
        max_findings_per_file: tunables.max_findings_per_file,
        max_total_findings: tunables.max_total_findings,
        engine: EngineOptions {
            signature: SignatureOptions {
                regex_timeout_ms: tunables.regex_timeout_ms,
                ..SignatureOptions::default()
            },
            behavioral,
        },
        enable_meta_dedup: args.enable_meta,
        attach_confidence,
        min_confidence: args.min_confidence,
        fix: args.fix,
        include_binary: force_recursive || args.full_depth,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    vigil_pipeline::install_signal_handler(Arc::clone(&cancel));

    let started = Instant::now();
    let outcome = run_scan(&targets, rules, cache, &opts, cancel, None).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let target_meta: Vec<TargetMeta> = outcome
        .targets
        .iter()
        .map(|t| TargetMeta {
            path: t.path.clone(),
            kind: target_kind_label(t.kind).to_string(),
            error: None,
        })
        .collect();

    let mut target_kinds: Vec<String> = outcome
        .targets
        .iter()
        .map(|t| target_kind_label(t.kind).to_string())
        .collect();
    target_kinds.sort();
    target_kinds.dedup();

    let envelope = build_envelope(
        outcome.findings.clone(),
        target_meta,
        outcome.scanned_files,
        elapsed_ms,
        target_kinds,
        vec!["filesystem".to_string()],
        None,
    );

    render(&envelope, args.format, args.output.as_deref(), args.show_confidence);
    print_warnings(&outcome.warnings, args.format);

    if let Some(dropped) = outcome.confidence_dropped {
        if !matches!(args.format, crate::cli::args::OutputFormat::Json) {
            eprintln!("confidence filter dropped {dropped} findings below the threshold");
        }
    }

    match fail_on {
        Some(threshold) => {
            let code = vigil_report::exit_code(&outcome.findings, Some(threshold));
            i32::from(code)
        }
        None => EXIT_SUCCESS,
    }
}
