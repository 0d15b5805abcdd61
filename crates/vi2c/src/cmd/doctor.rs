use std::path::Path;

use serde::Serialize;
use vi2c_io::{describe, DeviceInfo};

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    device: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, device: &Path, format: OutputFormat) -> CliResult<i32> {
    let info = describe(device);
    let checks = device_checks(&info);

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/vi2c/cli/v1/doctor-report.schema.json",
        device: device.display().to_string(),
        checks,
        overall,
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn device_checks(info: &DeviceInfo) -> Vec<CheckResult> {
    let mut checks = vec![platform_check()];

    if !info.exists {
        checks.push(CheckResult {
            name: "device_present".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{} not found (is the module loaded?)", info.path.display()),
        });
        for name in ["device_kind", "device_readable", "device_writable"] {
            checks.push(CheckResult {
                name: name.to_string(),
                status: CheckStatus::Skip,
                detail: "device not present".to_string(),
            });
        }
        return checks;
    }

    checks.push(CheckResult {
        name: "device_present".to_string(),
        status: CheckStatus::Pass,
        detail: format!("{} exists", info.path.display()),
    });
    checks.push(kind_check(info));
    checks.push(access_check("device_readable", info.readable, "read"));
    checks.push(access_check("device_writable", info.writable, "write"));
    checks
}

fn kind_check(info: &DeviceInfo) -> CheckResult {
    match (info.char_device, info.device_number) {
        (true, Some((major, minor))) => CheckResult {
            name: "device_kind".to_string(),
            status: CheckStatus::Pass,
            detail: format!("character device {major}:{minor}"),
        },
        (true, None) => CheckResult {
            name: "device_kind".to_string(),
            status: CheckStatus::Pass,
            detail: "character device".to_string(),
        },
        // Regular files are accepted as stand-ins.
        (false, _) => CheckResult {
            name: "device_kind".to_string(),
            status: CheckStatus::Warn,
            detail: "not a character device".to_string(),
        },
    }
}

fn access_check(name: &str, allowed: bool, verb: &str) -> CheckResult {
    if allowed {
        CheckResult {
            name: name.to_string(),
            status: CheckStatus::Pass,
            detail: format!("{verb} permitted"),
        }
    } else {
        CheckResult {
            name: name.to_string(),
            status: CheckStatus::Fail,
            detail: format!("{verb} not permitted for this user"),
        }
    }
}

fn platform_check() -> CheckResult {
    CheckResult {
        name: "platform".to_string(),
        status: CheckStatus::Info,
        detail: format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH),
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("vi2c doctor ({})\n", output.device);
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn info(exists: bool, char_device: bool) -> DeviceInfo {
        DeviceInfo {
            path: PathBuf::from("/dev/vI2C"),
            exists,
            char_device,
            device_number: char_device.then_some((240, 0)),
            readable: exists,
            writable: exists,
        }
    }

    #[test]
    fn missing_device_fails_and_skips_the_rest() {
        let checks = device_checks(&info(false, false));
        assert!(checks
            .iter()
            .any(|c| c.name == "device_present" && c.status == CheckStatus::Fail));
        assert_eq!(
            checks
                .iter()
                .filter(|c| c.status == CheckStatus::Skip)
                .count(),
            3
        );
    }

    #[test]
    fn char_device_reports_numbers() {
        let checks = device_checks(&info(true, true));
        let kind = checks
            .iter()
            .find(|c| c.name == "device_kind")
            .expect("kind check present");
        assert_eq!(kind.status, CheckStatus::Pass);
        assert_eq!(kind.detail, "character device 240:0");
        assert!(checks.iter().all(|c| c.status != CheckStatus::Fail));
    }

    #[test]
    fn regular_file_only_warns() {
        let checks = device_checks(&info(true, false));
        assert!(checks
            .iter()
            .any(|c| c.name == "device_kind" && c.status == CheckStatus::Warn));
    }

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            schema_id: "x",
            device: "/dev/vI2C".to_string(),
            checks: vec![platform_check()],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
    }
}
