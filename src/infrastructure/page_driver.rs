//! 页面驱动器 - 基础设施层
//!
//! 持有唯一的 page 资源，向上层暴露"在页面里做一件事"的能力：
//! 执行 JS、点击、读文本、等待元素可见 / 文本出现。
//!
//! 所有交互都通过 JS 求值实现，选择器和文本一律经
//! `serde_json::to_string` 嵌入，避免引号转义问题。
//! 门户的 UI 存在点击不生效、横幅遮挡等问题，因此这里的
//! 点击能力全部返回布尔值，由上层用等待原语验证结果。

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::infrastructure::wait::wait_until;

/// 页面驱动器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval / 点击 / 读取 / 等待能力
/// - 不认识查看器、工具栏等业务概念
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（导航等操作仍走原生 API）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 元素是否存在且可见（有布局盒判定，对 fixed 定位同样有效）
    ///
    /// 求值失败一律视为不可见，交给上层的等待逻辑兜底。
    pub async fn visible(&self, selector: &str) -> bool {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return !!(el && el.getClientRects().length > 0);
            }})()"#,
            sel = json_str(selector),
        );
        self.eval_as::<bool>(js_code).await.unwrap_or(false)
    }

    /// 读取元素的 innerText（元素不存在返回 None）
    pub async fn text(&self, selector: &str) -> Result<Option<String>> {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerText : null;
            }})()"#,
            sel = json_str(selector),
        );
        match self.eval(js_code).await? {
            JsonValue::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// 点击可见元素，返回是否真的点到了
    pub async fn click(&self, selector: &str) -> bool {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el || el.getClientRects().length === 0) return false;
                el.click();
                return true;
            }})()"#,
            sel = json_str(selector),
        );
        self.eval_as::<bool>(js_code).await.unwrap_or(false)
    }

    /// 设置输入框的值并触发 input 事件
    pub async fn set_value(&self, selector: &str, value: &str) -> bool {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = json_str(selector),
            val = json_str(value),
        );
        self.eval_as::<bool>(js_code).await.unwrap_or(false)
    }

    /// 提交输入框所属的表单
    pub async fn submit_form_of(&self, selector: &str) -> bool {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el || !el.form) return false;
                el.form.submit();
                return true;
            }})()"#,
            sel = json_str(selector),
        );
        self.eval_as::<bool>(js_code).await.unwrap_or(false)
    }

    /// 等待元素可见
    pub async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
        interval: Duration,
    ) -> bool {
        wait_until(timeout, interval, || self.visible(selector)).await
    }

    /// 等待元素可见并点击（每轮探测都重新尝试点击）
    pub async fn wait_and_click(
        &self,
        selector: &str,
        timeout: Duration,
        interval: Duration,
    ) -> bool {
        wait_until(timeout, interval, || self.click(selector)).await
    }

    /// 等待元素文本中字面出现 `needle`
    pub async fn wait_for_text(
        &self,
        selector: &str,
        needle: &str,
        timeout: Duration,
        interval: Duration,
    ) -> bool {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return !!(el && el.innerText && el.innerText.includes({needle}));
            }})()"#,
            sel = json_str(selector),
            needle = json_str(needle),
        );
        wait_until(timeout, interval, || async {
            self.eval_as::<bool>(js_code.clone()).await.unwrap_or(false)
        })
        .await
    }
}

/// 将字符串安全嵌入 JS 源码
fn json_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_str_escapes_quotes() {
        assert_eq!(json_str(r#"a"b"#), r#""a\"b""#);
        assert_eq!(json_str("#viewer_toolbar .btn"), "\"#viewer_toolbar .btn\"");
    }
}
