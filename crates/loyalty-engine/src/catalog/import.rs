//! 奖品批量导入解析
//!
//! 每行格式：`名称, 代币, 库存[, 图片地址]`。
//! 首行包含 "name" 或 "cost"（不区分大小写）时视为表头跳过，空行忽略。
//! 无效行单独报错，不影响其他行。

use crate::error::LoyaltyError;
use crate::models::NewReward;

/// 单行解析结果
pub type ParsedRow = std::result::Result<NewReward, LoyaltyError>;

/// 解析导入文本，返回每个非空数据行的结果
pub fn parse_rows(text: &str) -> Vec<ParsedRow> {
    text.lines()
        .enumerate()
        .filter(|(index, line)| !(*index == 0 && is_header(line)))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_row(index + 1, line))
        .collect()
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("name") || lower.contains("cost")
}

fn parse_row(line_no: usize, line: &str) -> ParsedRow {
    let reject = |reason: &str| LoyaltyError::InvalidCatalogRow {
        line: line_no,
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = line.splitn(4, ',').map(str::trim).collect();
    if fields.len() < 3 {
        return Err(reject("缺少字段，需要 名称, 代币, 库存"));
    }

    let name = fields[0];
    if name.is_empty() {
        return Err(reject("名称为空"));
    }

    let cost: i64 = fields[1]
        .parse()
        .map_err(|_| reject(&format!("代币数无法解析: '{}'", fields[1])))?;
    if cost <= 0 {
        return Err(reject(&format!("代币数必须为正数: {cost}")));
    }

    let stock: i64 = fields[2]
        .parse()
        .map_err(|_| reject(&format!("库存无法解析: '{}'", fields[2])))?;
    let stock = u32::try_from(stock).map_err(|_| reject(&format!("库存超出范围: {stock}")))?;

    let mut reward = NewReward::new(name, cost, stock);
    if let Some(image) = fields.get(3).filter(|image| !image.is_empty()) {
        reward = reward.with_image(*image);
    }
    Ok(reward)
}
