#[cfg(test)]
pub const POST_HELLO: &str = "---
title: Hello, World
date: 2015-04-18 09:00:00
categories: [general]
tags:
  - intro
  - meta
---
Welcome to the blog.

This first post exists mostly so that the layout has something to render.
More substantial writing will follow once the plumbing settles down.
";

#[cfg(test)]
pub const POST_NO_TITLE: &str = "---
date: 2025-01-01
---
Body
";

#[cfg(test)]
pub const POST_BAD_DATE: &str = "---
title: Row level security notes
date: next tuesday
---
SQL Server lets you attach a predicate function to a table.
";
