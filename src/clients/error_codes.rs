//! 平台错误码说明表
//!
//! 仅用于日志诊断，流程不依据具体错误码分支

use phf::phf_map;

static ERROR_CODES: phf::Map<i64, &'static str> = phf_map! {
    0i64 => "请求成功",
    40001i64 => "AppSecret 错误或 access_token 无效",
    40002i64 => "不合法的凭证类型",
    40007i64 => "不合法的媒体文件 id（封面或图片素材无效）",
    40009i64 => "图片文件大小超过限制",
    40013i64 => "不合法的 AppID",
    40113i64 => "不支持的文件类型",
    40125i64 => "无效的 AppSecret",
    40164i64 => "调用接口的 IP 地址不在白名单中",
    41001i64 => "缺少 access_token 参数",
    41005i64 => "缺少多媒体文件数据",
    42001i64 => "access_token 超时",
    44004i64 => "文本消息内容为空",
    45002i64 => "消息内容超过长度限制",
    45003i64 => "标题超过长度限制",
    45004i64 => "摘要超过长度限制",
    45009i64 => "接口调用超过每日限额",
    45110i64 => "作者名称超过长度限制",
    45166i64 => "正文内容校验失败（含不支持的标签、属性或字符）",
    48001i64 => "接口未授权，请确认公众号已获得该接口权限",
    53404i64 => "账号已被限制带货能力",
};

/// 返回错误码的中文说明
pub fn explain(code: i64) -> &'static str {
    if code == -1 {
        return "系统繁忙，请稍后再试";
    }
    ERROR_CODES.get(&code).copied().unwrap_or("未知错误码")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_codes() {
        assert_eq!(explain(40164), "调用接口的 IP 地址不在白名单中");
        assert_eq!(explain(-1), "系统繁忙，请稍后再试");
        assert_eq!(explain(99999), "未知错误码");
    }
}
