//! Status-code taxonomy for the GM/T 0016 command set.
//!
//! Every reply payload begins with a 32-bit status word.  `0x00000000` is
//! the single success value; everything else is one of the failures below
//! or an unknown code.  The table is a compile-time constant sorted by
//! code, so lookups are a binary search with no startup cost and no
//! teardown.
//!
//! Stable identifiers are the lower-cased `SAR_*` names from the standard
//! and the descriptions are the vendor's original strings — both are part
//! of the observable surface (callers match on them and show them to
//! operators), so neither is translated or renamed.

/// One row of the status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    /// Numeric status word as it appears (byte-swapped) on the wire.
    pub code: u32,
    /// Machine-stable lower-case identifier, e.g. `"sar_invalidhandleerr"`.
    pub stable_id: &'static str,
    /// Human-readable vendor description.
    pub description: &'static str,
}

impl StatusEntry {
    /// Natural-order hex form of the code, e.g. `"0x0a000005"`.
    pub fn hex_value(&self) -> String {
        format!("0x{:08x}", self.code)
    }
}

/// Stable id substituted for codes outside the table.
pub const UNKNOWN_STABLE_ID: &str = "unknown";

/// Description substituted for codes outside the table.
pub const UNKNOWN_DESCRIPTION: &str = "未知错误";

/// The full status space of the standard, sorted by code.
///
/// The range `0x0a000001..=0x0a00003b` is non-contiguous: `0x0a000034` and
/// `0x0a000038` are not assigned.
pub const STATUS_TABLE: &[StatusEntry] = &[
    StatusEntry { code: 0x0000_0000, stable_id: "sar_ok", description: "成功" },
    StatusEntry { code: 0x0a00_0001, stable_id: "sar_fail", description: "失败" },
    StatusEntry { code: 0x0a00_0002, stable_id: "sar_unknownerr", description: "异常错误" },
    StatusEntry { code: 0x0a00_0003, stable_id: "sar_notsupportyeterr", description: "不支持的服务" },
    StatusEntry { code: 0x0a00_0004, stable_id: "sar_fileerr", description: "文件操作错误" },
    StatusEntry { code: 0x0a00_0005, stable_id: "sar_invalidhandleerr", description: "无效的句柄" },
    StatusEntry { code: 0x0a00_0006, stable_id: "sar_invalidparamerr", description: "无效的参数" },
    StatusEntry { code: 0x0a00_0007, stable_id: "sar_readfileerr", description: "读文件错误" },
    StatusEntry { code: 0x0a00_0008, stable_id: "sar_writefileerr", description: "写文件错误" },
    StatusEntry { code: 0x0a00_0009, stable_id: "sar_namelenerr", description: "名称长度错误" },
    StatusEntry { code: 0x0a00_000a, stable_id: "sar_keyusageerr", description: "密钥用途错误" },
    StatusEntry { code: 0x0a00_000b, stable_id: "sar_moduluslenerr", description: "模的长度错误" },
    StatusEntry { code: 0x0a00_000c, stable_id: "sar_notinitializeerr", description: "未初始化" },
    StatusEntry { code: 0x0a00_000d, stable_id: "sar_objerr", description: "对象错误" },
    StatusEntry { code: 0x0a00_000e, stable_id: "sar_memoryerr", description: "内存错误" },
    StatusEntry { code: 0x0a00_000f, stable_id: "sar_timeouterr", description: "超时" },
    StatusEntry { code: 0x0a00_0010, stable_id: "sar_indatalenerr", description: "输入数据长度错误" },
    StatusEntry { code: 0x0a00_0011, stable_id: "sar_indataerr", description: "输入数据错误" },
    StatusEntry { code: 0x0a00_0012, stable_id: "sar_genranderr", description: "生成随机数错误" },
    StatusEntry { code: 0x0a00_0013, stable_id: "sar_hashobjerr", description: "HASH 对象错" },
    StatusEntry { code: 0x0a00_0014, stable_id: "sar_hasherr", description: "HASH 运算错误" },
    StatusEntry { code: 0x0a00_0015, stable_id: "sar_genrsakeyerr", description: "产生 RSA 密钥错" },
    StatusEntry { code: 0x0a00_0016, stable_id: "sar_rsamoduluslenerr", description: "RSA 密钥较长错误" },
    StatusEntry { code: 0x0a00_0017, stable_id: "sar_cspimprtpubkeyerr", description: "CSP 服务导入公钥错误" },
    StatusEntry { code: 0x0a00_0018, stable_id: "sar_rsaencerr", description: "RSA 加密错误" },
    StatusEntry { code: 0x0a00_0019, stable_id: "sar_rsadecerr", description: "RSA 解密错误" },
    StatusEntry { code: 0x0a00_001a, stable_id: "sar_hashnotequaleerr", description: "HASH 值不相等" },
    StatusEntry { code: 0x0a00_001b, stable_id: "sar_keynotfounterr", description: "密钥未发现" },
    StatusEntry { code: 0x0a00_001c, stable_id: "sar_certnotfounterr", description: "证书未发现" },
    StatusEntry { code: 0x0a00_001d, stable_id: "sar_notexporterr", description: "对象未导出" },
    StatusEntry { code: 0x0a00_001e, stable_id: "sar_deckyptpaderr", description: "解密时做补丁错误" },
    StatusEntry { code: 0x0a00_001f, stable_id: "sar_maclenerr", description: "MAC长度错误" },
    StatusEntry { code: 0x0a00_0020, stable_id: "sar_buffer_too_small", description: "缓冲区不足" },
    StatusEntry { code: 0x0a00_0021, stable_id: "sar_keyinfotypeerr", description: "密钥类型错误" },
    StatusEntry { code: 0x0a00_0022, stable_id: "sar_not_eventerr", description: "无事件错误" },
    StatusEntry { code: 0x0a00_0023, stable_id: "sar_device_removed", description: "设备已移除" },
    StatusEntry { code: 0x0a00_0024, stable_id: "sar_pin_incorrect", description: "PIN不正确" },
    StatusEntry { code: 0x0a00_0025, stable_id: "sar_pin_locked", description: "PIN被锁死" },
    StatusEntry { code: 0x0a00_0026, stable_id: "sar_pin_invalid", description: "PIN无效" },
    StatusEntry { code: 0x0a00_0027, stable_id: "sar_pin_len_range", description: "PIN长度错误" },
    StatusEntry { code: 0x0a00_0028, stable_id: "sar_user_already_logged_in", description: "用户已经登录" },
    StatusEntry { code: 0x0a00_0029, stable_id: "sar_user_pin_not_initialized", description: "没有初始化用户口令" },
    StatusEntry { code: 0x0a00_002a, stable_id: "sar_user_type_invalid", description: "PIN类型错误" },
    StatusEntry { code: 0x0a00_002b, stable_id: "sar_application_name_invalid", description: "应用名称无效" },
    StatusEntry { code: 0x0a00_002c, stable_id: "sar_application_exists", description: "应用已经存在" },
    StatusEntry { code: 0x0a00_002d, stable_id: "sar_user_not_logged_in", description: "用户没有登录" },
    StatusEntry { code: 0x0a00_002e, stable_id: "sar_application_not_exists", description: "应用不存在" },
    StatusEntry { code: 0x0a00_002f, stable_id: "sar_file_already_exist", description: "文件已经存在" },
    StatusEntry { code: 0x0a00_0030, stable_id: "sar_no_room", description: "空间不足" },
    StatusEntry { code: 0x0a00_0031, stable_id: "sar_file_not_exist", description: "文件不存在" },
    StatusEntry { code: 0x0a00_0032, stable_id: "sar_reach_max_container_count", description: "已达到最大可管理容器数" },
    // GM/T 0016-2023 additions
    StatusEntry { code: 0x0a00_0033, stable_id: "sar_auth_blocked", description: "密钥已被锁住" },
    StatusEntry { code: 0x0a00_0035, stable_id: "sar_invalidcontainererr", description: "无效容器" },
    StatusEntry { code: 0x0a00_0036, stable_id: "sar_container_not_exists", description: "容器不存在" },
    StatusEntry { code: 0x0a00_0037, stable_id: "sar_container_exists", description: "容器已存在" },
    StatusEntry { code: 0x0a00_0039, stable_id: "sar_keynousageerr", description: "密钥未被使用" },
    StatusEntry { code: 0x0a00_003a, stable_id: "sar_fileattributeerr", description: "文件操作权限错误" },
    StatusEntry { code: 0x0a00_003b, stable_id: "sar_devnoauth", description: "设备未认证" },
];

// ── Lookups ───────────────────────────────────────────────────────────────────

/// True iff `code` is the single success value `0x00000000`.
pub fn is_success(code: u32) -> bool {
    code == 0
}

/// Looks up a status entry by its numeric code.
///
/// Returns `None` for codes outside the table; callers must treat absence
/// as an *unknown failure*, never as success.
pub fn by_code(code: u32) -> Option<&'static StatusEntry> {
    STATUS_TABLE
        .binary_search_by_key(&code, |e| e.code)
        .ok()
        .map(|i| &STATUS_TABLE[i])
}

/// Looks up a status entry by its natural-order hex form.
///
/// Accepts any case and an optional `0x`/`0X` prefix; reuses [`by_code`]
/// after parsing.
pub fn by_hex_str(text: &str) -> Option<&'static StatusEntry> {
    let trimmed = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let code = u32::from_str_radix(trimmed, 16).ok()?;
    by_code(code)
}

/// Looks up a status entry by its lower-case stable identifier.
pub fn by_stable_id(id: &str) -> Option<&'static StatusEntry> {
    STATUS_TABLE.iter().find(|e| e.stable_id == id)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
