//! Append-only JavaScript text buffer
//!
//! Both renderers write through these helpers. Helpers that wrap a body take
//! it as a closure so the structure around it (braces, `var` lists, the
//! context and unwinding boilerplate) is written in one place.

use crate::error::CompileResult;

#[derive(Debug, Default)]
pub struct JsStream {
    buffer: String,
}

impl JsStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn put(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn put_line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// `function(a,b){<body>}`
    pub fn put_function<F>(&mut self, arguments: &[String], body: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("function(");
        self.put(&arguments.join(","));
        self.put("){\n");
        body(self)?;
        self.put("}");
        Ok(())
    }

    /// `var a,b;` on one line, nothing for an empty list
    pub fn put_vars(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.put("var ");
        self.put(&names.join(","));
        self.put(";\n");
    }

    /// Temporaries start out as `nil`
    pub fn put_temps(&mut self, names: &[String]) {
        for name in names {
            self.put("var ");
            self.put(name);
            self.put("=nil;\n");
        }
    }

    /// Reset temporaries of an inlined block on entry
    pub fn put_temp_resets(&mut self, names: &[String]) {
        for name in names {
            self.put(name);
            self.put("=nil;\n");
        }
    }

    pub fn put_statement<F>(&mut self, statement: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        statement(self)?;
        self.put(";\n");
        Ok(())
    }

    pub fn put_return<F>(&mut self, value: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("return ");
        value(self)
    }

    pub fn put_assignment<F>(&mut self, target: &str, value: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put(target);
        self.put("=");
        value(self)
    }

    /// `if(<condition>){<then>}`
    pub fn put_if<F>(&mut self, condition: &str, then: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("if(");
        self.put(condition);
        self.put("){\n");
        then(self)?;
        self.put("}");
        Ok(())
    }

    /// `if(<condition>){<then>} else {<otherwise>}`
    pub fn put_if_else<F, G>(&mut self, condition: &str, then: F, otherwise: G) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
        G: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put_if(condition, then)?;
        self.put(" else {\n");
        otherwise(self)?;
        self.put("}");
        Ok(())
    }

    /// `while(true){<body>}`, the body breaks out itself
    pub fn put_loop<F>(&mut self, body: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("while(true){\n");
        body(self)?;
        self.put("}");
        Ok(())
    }

    /// Method-level context: `return <rt>.withContext(function($ctx1) {<body>}, <fill>)`
    pub fn put_context_for<F>(
        &mut self,
        runtime: &str,
        context: &str,
        fill: &str,
        body: F,
    ) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("return ");
        self.put(runtime);
        self.put(".withContext(function(");
        self.put(context);
        self.put(") {\n");
        body(self)?;
        self.put("}, function(");
        self.put(context);
        self.put(") {");
        self.put(context);
        self.put(".");
        self.put(fill);
        self.put("})");
        Ok(())
    }

    /// Catch the unwinding of a `^` inside a block and answer its value
    pub fn put_non_local_return_handling<F>(&mut self, body: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("var $early={};\ntry {\n");
        body(self)?;
        self.put("} catch(e) {if(e===$early)return e[0]; throw e}\n");
        Ok(())
    }

    /// `throw $early=[<value>]`
    pub fn put_non_local_return<F>(&mut self, value: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.put("throw $early=[");
        value(self)?;
        self.put("]");
        Ok(())
    }

    /// Comma separated list, each element rendered by `item`
    pub fn put_list<T, F>(&mut self, items: &[T], mut item: F) -> CompileResult<()>
    where
        F: FnMut(&mut Self, &T) -> CompileResult<()>,
    {
        for (i, value) in items.iter().enumerate() {
            if i > 0 {
                self.put(",");
            }
            item(self, value)?;
        }
        Ok(())
    }
}
