mod bar_chart;
mod pie_chart;
