use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::account::{AccountConfig, CommentPermission, ContentType, ProxyConfig};
use calamine::{open_workbook_auto, Reader};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const COL_NAME: &str = "账号名称";
pub const COL_APP_ID: &str = "appID";
pub const COL_APP_SECRET: &str = "app secret";
pub const COL_AUTHOR: &str = "作者名称";
pub const COL_FOLDER: &str = "存稿文件路径";
pub const COL_QUOTA: &str = "存稿数量";
pub const COL_CONTENT_TYPE: &str = "内容类型";
pub const COL_ORIGINAL: &str = "是否开始原创";
pub const COL_COMMENT: &str = "是否开启评论";
pub const COL_COMMENT_PERMISSION: &str = "评论权限";
pub const COL_PROXY_HOST: &str = "代理IP";
pub const COL_PROXY_PORT: &str = "代理端口";
pub const COL_PROXY_USER: &str = "代理用户名";
pub const COL_PROXY_PASS: &str = "代理密码";

/// 缺少任意一列都会中止整个运行
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_APP_ID,
    COL_APP_SECRET,
    COL_AUTHOR,
    COL_FOLDER,
    COL_QUOTA,
    COL_CONTENT_TYPE,
    COL_ORIGINAL,
    COL_COMMENT,
    COL_COMMENT_PERMISSION,
];

const TEMPLATE_COLUMNS: &[&str] = &[
    COL_NAME,
    COL_APP_ID,
    COL_APP_SECRET,
    COL_AUTHOR,
    COL_FOLDER,
    COL_QUOTA,
    COL_CONTENT_TYPE,
    COL_ORIGINAL,
    COL_COMMENT,
    COL_COMMENT_PERMISSION,
    COL_PROXY_HOST,
    COL_PROXY_PORT,
    COL_PROXY_USER,
    COL_PROXY_PASS,
];

/// 表头 + 数据行，所有单元格都按字符串处理
#[derive(Debug, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 读取账号表（第一个工作表），并解析为账号配置列表
///
/// 缺少必需列时返回错误；单行解析失败只跳过该账号
pub fn load_accounts(path: &Path) -> AppResult<Vec<AccountConfig>> {
    let sheet = read_sheet(path)?;
    check_columns(&sheet.headers)?;

    info!(
        "成功从 '{}' 读取 {} 条账号配置",
        path.display(),
        sheet.rows.len()
    );

    let mut accounts = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cells: HashMap<&str, &str> = sheet
            .headers
            .iter()
            .map(String::as_str)
            .zip(row.iter().map(String::as_str))
            .collect();

        match parse_row(index, &cells) {
            Ok(account) => accounts.push(account),
            Err(e) => warn!("⚠️ 第 {} 行账号配置无效，跳过: {}", index + 2, e),
        }
    }

    Ok(accounts)
}

/// 按扩展名选择 CSV 或 Excel 读取
pub fn read_sheet(path: &Path) -> AppResult<Sheet> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" => read_workbook(path),
        _ => Err(ConfigError::UnsupportedSheet(path.display().to_string()).into()),
    }
}

fn read_csv(path: &Path) -> AppResult<Sheet> {
    let sheet_error = |e: csv::Error| ConfigError::SheetReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(sheet_error)?;

    let headers = reader
        .headers()
        .map_err(sheet_error)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(sheet_error)?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(Sheet { headers, rows })
}

fn read_workbook(path: &Path) -> AppResult<Sheet> {
    let sheet_error = |message: String| ConfigError::SheetReadFailed {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| sheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| sheet_error("工作簿中没有工作表".to_string()))?
        .map_err(|e| sheet_error(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());

    let headers = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(|h| normalize_header(h))
        .collect();

    Ok(Sheet {
        headers,
        rows: rows.collect(),
    })
}

/// 去掉 UTF-8 BOM 和首尾空白
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

pub fn check_columns(headers: &[String]) -> Result<(), ConfigError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingColumns(missing))
    }
}

/// 解析单行账号配置
///
/// # 参数
/// - `index`: 数据行序号（从 0 开始，用于默认账号名）
/// - `cells`: 列名 → 单元格
pub fn parse_row(index: usize, cells: &HashMap<&str, &str>) -> Result<AccountConfig, ConfigError> {
    let cell = |col: &str| cells.get(col).map(|v| v.trim()).unwrap_or_default();

    let name = match cell(COL_NAME) {
        "" => format!("账号{}", index + 1),
        name => name.to_string(),
    };

    let quota = parse_quota(&name, cell(COL_QUOTA))?;

    let content_type =
        ContentType::parse(cell(COL_CONTENT_TYPE)).ok_or_else(|| ConfigError::InvalidContentType {
            account: name.clone(),
            value: cell(COL_CONTENT_TYPE).to_string(),
        })?;

    let proxy = parse_proxy(
        &name,
        cell(COL_PROXY_HOST),
        cell(COL_PROXY_PORT),
        cell(COL_PROXY_USER),
        cell(COL_PROXY_PASS),
    );

    Ok(AccountConfig {
        app_id: cell(COL_APP_ID).to_string(),
        app_secret: cell(COL_APP_SECRET).to_string(),
        author: cell(COL_AUTHOR).to_string(),
        content_folder: PathBuf::from(cell(COL_FOLDER)),
        quota,
        content_type,
        is_original: parse_flag(cell(COL_ORIGINAL)),
        comment_enabled: parse_flag(cell(COL_COMMENT)),
        comment_permission: CommentPermission::parse(cell(COL_COMMENT_PERMISSION)),
        proxy,
        name,
    })
}

/// 空值和负数视为 0，"2.0" 这样的小数截断取整
pub fn parse_quota(account: &str, value: &str) -> Result<usize, ConfigError> {
    if value.is_empty() {
        warn!("⚠️ 账号 '{}' 的存稿数量为空，将视为0处理", account);
        return Ok(0);
    }

    let parsed = value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        .ok_or_else(|| ConfigError::InvalidQuota {
            account: account.to_string(),
            value: value.to_string(),
        })?;

    if parsed < 0 {
        warn!("⚠️ 账号 '{}' 的存稿数量配置为负数，将视为0处理", account);
        return Ok(0);
    }

    Ok(parsed as usize)
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "是" | "true" | "1" | "yes"
    )
}

fn parse_proxy(account: &str, host: &str, port: &str, user: &str, pass: &str) -> Option<ProxyConfig> {
    if host.is_empty() || port.is_empty() {
        return None;
    }

    // Excel 里的端口可能读成 "1080.0"
    let port_value = port.strip_suffix(".0").unwrap_or(port);
    match port_value.parse::<u16>() {
        Ok(port) => Some(ProxyConfig {
            host: host.to_string(),
            port,
            username: (!user.is_empty()).then(|| user.to_string()),
            password: (!pass.is_empty()).then(|| pass.to_string()),
        }),
        Err(_) => {
            warn!(
                "⚠️ 账号 '{}' 的代理端口 '{}' 不是有效数字，此账号代理将不被使用",
                account, port
            );
            None
        }
    }
}

/// 生成账号表模板（CSV，带 BOM 以便 Excel 正确识别中文）
///
/// 文件已存在时拒绝覆盖
pub fn write_template(path: &Path) -> AppResult<()> {
    if path.exists() {
        return Err(FileError::AlreadyExists(path.display().to_string()).into());
    }

    let mut file = std::fs::File::create(path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    file.write_all("\u{feff}".as_bytes())
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    let csv_error = |source: csv::Error| FileError::CsvFailed {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(TEMPLATE_COLUMNS).map_err(csv_error)?;
    writer
        .write_record([
            "示例公众号账号1",
            "wx1234567890abcdef",
            "abcdef1234567890abcdef1234567890",
            "示例作者张三",
            "/path/to/your/account1/articles",
            "2",
            "图文",
            "是",
            "是",
            "所有人",
            "",
            "",
            "",
            "",
        ])
        .map_err(csv_error)?;
    writer
        .write_record([
            "我的测试服务号",
            "wx0987654321fedcba",
            "fedcba0987654321fedcba0987654321",
            "测试小编",
            "C:\\Users\\YourName\\Documents\\Account2Posts",
            "1",
            "贴图",
            "否",
            "否",
            "仅粉丝",
            "127.0.0.1",
            "1080",
            "proxyuser",
            "proxypass",
        ])
        .map_err(csv_error)?;
    writer
        .flush()
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!("已生成账号表模板: '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row<'a>() -> HashMap<&'a str, &'a str> {
        HashMap::from([
            (COL_APP_ID, "wx1"),
            (COL_APP_SECRET, "secret"),
            (COL_AUTHOR, "小编"),
            (COL_FOLDER, "/tmp/posts"),
            (COL_QUOTA, "3"),
            (COL_CONTENT_TYPE, "图文"),
            (COL_ORIGINAL, "是"),
            (COL_COMMENT, "no"),
            (COL_COMMENT_PERMISSION, "仅粉丝"),
        ])
    }

    #[test]
    fn test_check_columns_enumerates_missing() {
        let headers = vec![COL_APP_ID.to_string(), COL_AUTHOR.to_string()];
        match check_columns(&headers) {
            Err(ConfigError::MissingColumns(missing)) => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 2);
                assert!(missing.contains(&COL_APP_SECRET.to_string()));
                assert!(!missing.contains(&COL_APP_ID.to_string()));
            }
            other => panic!("应该缺列: {:?}", other),
        }
    }

    #[test]
    fn test_parse_quota_rules() {
        assert_eq!(parse_quota("a", "").unwrap(), 0);
        assert_eq!(parse_quota("a", "2").unwrap(), 2);
        assert_eq!(parse_quota("a", "2.0").unwrap(), 2);
        assert_eq!(parse_quota("a", "-3").unwrap(), 0);
        assert!(matches!(
            parse_quota("a", "两篇"),
            Err(ConfigError::InvalidQuota { .. })
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("是"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("否"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_row_defaults_name_and_skips_proxy() {
        let account = parse_row(4, &full_row()).unwrap();
        assert_eq!(account.name, "账号5");
        assert_eq!(account.quota, 3);
        assert!(account.is_original);
        assert!(!account.comment_enabled);
        assert_eq!(account.comment_permission, CommentPermission::FansOnly);
        assert!(account.proxy.is_none());
    }

    #[test]
    fn test_parse_row_bad_port_disables_proxy() {
        let mut row = full_row();
        row.insert(COL_PROXY_HOST, "10.0.0.1");
        row.insert(COL_PROXY_PORT, "abc");
        assert!(parse_row(0, &row).unwrap().proxy.is_none());

        row.insert(COL_PROXY_PORT, "1080.0");
        let proxy = parse_row(0, &row).unwrap().proxy.unwrap();
        assert_eq!(proxy.port, 1080);
        assert!(!proxy.has_auth());
    }

    #[test]
    fn test_parse_row_unknown_content_type() {
        let mut row = full_row();
        row.insert(COL_CONTENT_TYPE, "视频");
        assert!(matches!(
            parse_row(0, &row),
            Err(ConfigError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_template_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.csv");

        write_template(&path).unwrap();
        let accounts = load_accounts(&path).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].name, "示例公众号账号1");
        assert_eq!(accounts[1].content_type, ContentType::ImageSet);
        assert_eq!(accounts[1].proxy.as_ref().unwrap().port, 1080);

        assert!(matches!(
            write_template(&path),
            Err(AppError::File(FileError::AlreadyExists(_)))
        ));
    }

    #[test]
    fn test_missing_columns_abort_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "账号名称,appID\n号1,wx1\n").unwrap();

        assert!(matches!(
            load_accounts(&path),
            Err(AppError::Config(ConfigError::MissingColumns(_)))
        ));
    }
}
